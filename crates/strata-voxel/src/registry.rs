//! Block type registry: maps compact [`BlockId`] values to [`BlockDef`]
//! metadata.
//!
//! The registry is built once at startup. Air is always id 0 so that
//! air-filled grid memory means empty space, and a block with no texture
//! references is void: invisible, never meshed.

use std::collections::HashMap;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact identifier stored in every voxel cell (2 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(pub u16);

impl BlockId {
    /// The void block, present in every registry.
    pub const AIR: BlockId = BlockId(0);
}

/// Texture-array layer per face, indexed +X, -X, +Y, -Y, +Z, -Z.
///
/// The order matches `FaceDirection::index()` in the mesher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceTextures {
    pub layers: [u16; 6],
}

impl FaceTextures {
    /// Same layer on all six faces.
    pub const fn uniform(layer: u16) -> Self {
        Self { layers: [layer; 6] }
    }

    /// Distinct top (+Y) and bottom (-Y) layers, `side` elsewhere.
    pub const fn capped(top: u16, side: u16, bottom: u16) -> Self {
        Self {
            layers: [side, side, top, bottom, side, side],
        }
    }
}

/// Full descriptor for a block type.
#[derive(Clone, Debug)]
pub struct BlockDef {
    /// Human-readable name (e.g. "stone", "glass").
    pub name: String,
    /// Whether the ray caster may select this block.
    pub pointable: bool,
    /// Transparent blocks do not occlude neighbor faces and render in the
    /// back-to-front translucent pass.
    pub transparent: bool,
    /// Light-emitting blocks spawn a shadow-casting point light per visible
    /// face.
    pub light: bool,
    /// Per-face texture layers. `None` means the block is void: invisible
    /// and skipped entirely by the mesher.
    pub textures: Option<FaceTextures>,
}

impl BlockDef {
    /// An ordinary opaque, pointable block.
    pub fn solid(name: &str, textures: FaceTextures) -> Self {
        Self {
            name: name.to_string(),
            pointable: true,
            transparent: false,
            light: false,
            textures: Some(textures),
        }
    }

    /// A see-through, pointable block.
    pub fn transparent(name: &str, textures: FaceTextures) -> Self {
        Self {
            name: name.to_string(),
            pointable: true,
            transparent: true,
            light: false,
            textures: Some(textures),
        }
    }

    /// An opaque block whose faces emit point lights.
    pub fn luminous(name: &str, textures: FaceTextures) -> Self {
        Self {
            name: name.to_string(),
            pointable: true,
            transparent: false,
            light: true,
            textures: Some(textures),
        }
    }
}

/// Errors that can occur during block registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A block with the same name has already been registered.
    #[error("duplicate block name: {0}")]
    DuplicateName(String),
    /// All id slots have been consumed.
    #[error("block registry is full (max 65536 types)")]
    RegistryFull,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps [`BlockId`] → [`BlockDef`] with O(1) lookup by index and O(1)
/// reverse lookup by name.
pub struct BlockRegistry {
    /// Dense array where `index == BlockId.0`.
    defs: Vec<BlockDef>,
    /// Reverse lookup: name → id.
    by_name: HashMap<String, BlockId>,
}

impl BlockRegistry {
    /// Creates a registry with air pre-registered as id 0.
    pub fn new() -> Self {
        let air = BlockDef {
            name: "air".to_string(),
            pointable: false,
            transparent: true,
            light: false,
            textures: None,
        };

        let mut by_name = HashMap::new();
        by_name.insert("air".to_string(), BlockId::AIR);

        Self {
            defs: vec![air],
            by_name,
        }
    }

    /// Registers a block type and returns its assigned id.
    ///
    /// Ids are assigned sequentially starting from 1 (0 is air).
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateName`] if the name already exists,
    /// [`RegistryError::RegistryFull`] if the id space is exhausted.
    pub fn register(&mut self, def: BlockDef) -> Result<BlockId, RegistryError> {
        if self.by_name.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.defs.len() > u16::MAX as usize {
            return Err(RegistryError::RegistryFull);
        }

        let id = BlockId(self.defs.len() as u16);
        self.by_name.insert(def.name.clone(), id);
        self.defs.push(def);
        Ok(id)
    }

    /// Returns the definition for a given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range — ids are only produced by the
    /// registry itself, so this indicates a caller bug.
    pub fn def(&self, id: BlockId) -> &BlockDef {
        &self.defs[id.0 as usize]
    }

    /// Returns the id for a named block, or `None` if not registered.
    pub fn lookup(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    /// Number of registered types, including air.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// `true` if only air is registered.
    pub fn is_empty(&self) -> bool {
        self.defs.len() <= 1
    }

    /// `true` if the block is invisible (no texture references).
    ///
    /// Unknown ids are treated as void, like air.
    pub fn is_void(&self, id: BlockId) -> bool {
        match self.defs.get(id.0 as usize) {
            Some(def) => def.textures.is_none(),
            None => true,
        }
    }

    /// `true` if the block does not occlude neighbor faces.
    pub fn is_transparent(&self, id: BlockId) -> bool {
        match self.defs.get(id.0 as usize) {
            Some(def) => def.transparent,
            None => true,
        }
    }

    /// `true` if the block's faces emit point lights.
    pub fn is_light(&self, id: BlockId) -> bool {
        self.defs
            .get(id.0 as usize)
            .is_some_and(|def| def.light)
    }

    /// `true` if the ray caster may select this block.
    pub fn is_pointable(&self, id: BlockId) -> bool {
        self.defs
            .get(id.0 as usize)
            .is_some_and(|def| def.pointable)
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stone_def() -> BlockDef {
        BlockDef::solid("stone", FaceTextures::uniform(1))
    }

    fn glass_def() -> BlockDef {
        BlockDef::transparent("glass", FaceTextures::uniform(2))
    }

    #[test]
    fn test_air_is_id_zero_and_void() {
        let registry = BlockRegistry::new();
        let air = registry.def(BlockId::AIR);
        assert_eq!(air.name, "air");
        assert!(air.textures.is_none());
        assert!(registry.is_void(BlockId::AIR));
        assert!(!registry.is_pointable(BlockId::AIR));
    }

    #[test]
    fn test_register_returns_sequential_ids() {
        let mut registry = BlockRegistry::new();
        let stone = registry.register(stone_def()).unwrap();
        let glass = registry.register(glass_def()).unwrap();
        assert_eq!(stone, BlockId(1));
        assert_eq!(glass, BlockId(2));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = BlockRegistry::new();
        registry.register(stone_def()).unwrap();
        let result = registry.register(stone_def());
        assert!(matches!(result, Err(RegistryError::DuplicateName(_))));
    }

    #[test]
    fn test_lookup_by_name() {
        let mut registry = BlockRegistry::new();
        let stone = registry.register(stone_def()).unwrap();
        assert_eq!(registry.lookup("stone"), Some(stone));
        assert_eq!(registry.lookup("bedrock"), None);
    }

    #[test]
    fn test_classification_helpers() {
        let mut registry = BlockRegistry::new();
        let stone = registry.register(stone_def()).unwrap();
        let glass = registry.register(glass_def()).unwrap();
        let lamp = registry
            .register(BlockDef::luminous("lamp", FaceTextures::uniform(3)))
            .unwrap();

        assert!(!registry.is_void(stone));
        assert!(!registry.is_transparent(stone));
        assert!(registry.is_transparent(glass));
        assert!(registry.is_light(lamp));
        assert!(!registry.is_light(stone));
        assert!(registry.is_pointable(stone));
    }

    #[test]
    fn test_unknown_id_is_void_and_transparent() {
        let registry = BlockRegistry::new();
        let bogus = BlockId(999);
        assert!(registry.is_void(bogus));
        assert!(registry.is_transparent(bogus));
        assert!(!registry.is_pointable(bogus));
    }

    #[test]
    fn test_capped_textures_order() {
        // Layer order is +X, -X, +Y, -Y, +Z, -Z.
        let tex = FaceTextures::capped(10, 11, 12);
        assert_eq!(tex.layers, [11, 11, 10, 12, 11, 11]);
    }
}
