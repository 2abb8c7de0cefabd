//! The demo block palette and its procedural texture layers.
//!
//! Registry entries and texture array layers are built together so each
//! block's `FaceTextures` indices line up with the layers uploaded to the
//! GPU. No asset files: every layer is painted at startup.

use strata_render::{bordered_layer, flat_layer, speckled_layer};
use strata_voxel::{BlockDef, BlockId, BlockRegistry, FaceTextures, RegistryError};

/// Ids of the demo block types.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub stone: BlockId,
    pub grass: BlockId,
    pub glass: BlockId,
    pub lamp: BlockId,
}

/// Texture array layer order. Indices here must match the `FaceTextures`
/// assignments below.
const LAYER_STONE: u16 = 0;
const LAYER_GRASS_TOP: u16 = 1;
const LAYER_GRASS_SIDE: u16 = 2;
const LAYER_DIRT: u16 = 3;
const LAYER_GLASS: u16 = 4;
const LAYER_LAMP: u16 = 5;

/// Builds the demo registry and the texture layers backing it.
pub fn demo_palette() -> Result<(BlockRegistry, Palette, Vec<Vec<u8>>), RegistryError> {
    let layers = vec![
        speckled_layer([125, 125, 130], 12, 1),
        speckled_layer([70, 140, 60], 14, 2),
        speckled_layer([110, 90, 60], 10, 3),
        speckled_layer([120, 95, 65], 10, 4),
        flat_layer([180, 210, 235, 70]),
        bordered_layer([255, 235, 170], [95, 75, 45], 5),
    ];

    let mut registry = BlockRegistry::new();
    let palette = Palette {
        stone: registry.register(BlockDef::solid("stone", FaceTextures::uniform(LAYER_STONE)))?,
        grass: registry.register(BlockDef::solid(
            "grass",
            FaceTextures::capped(LAYER_GRASS_TOP, LAYER_GRASS_SIDE, LAYER_DIRT),
        ))?,
        glass: registry
            .register(BlockDef::transparent("glass", FaceTextures::uniform(LAYER_GLASS)))?,
        lamp: registry.register(BlockDef::luminous("lamp", FaceTextures::uniform(LAYER_LAMP)))?,
    };

    Ok((registry, palette, layers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_registers_all_demo_blocks() {
        let (registry, palette, layers) = demo_palette().unwrap();
        assert_eq!(registry.len(), 5); // air + four defined types
        assert_eq!(layers.len(), 6);
        assert!(!registry.is_transparent(palette.stone));
        assert!(registry.is_transparent(palette.glass));
        assert!(registry.is_light(palette.lamp));
        assert_eq!(registry.lookup("grass"), Some(palette.grass));
    }

    #[test]
    fn test_grass_faces_reference_distinct_layers() {
        let (registry, palette, _layers) = demo_palette().unwrap();
        let def = registry.def(palette.grass);
        let textures = def.textures.as_ref().unwrap();
        let top = textures.layers[2];
        let bottom = textures.layers[3];
        let side = textures.layers[0];
        assert_ne!(top, side);
        assert_ne!(bottom, side);
    }
}
