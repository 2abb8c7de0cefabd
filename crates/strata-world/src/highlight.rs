//! Keyed single-face outline meshes.
//!
//! A highlight marks the face a UI actor is pointing at. Highlights live
//! outside the chunk pipeline: one GPU mesh per key, replaced whole when
//! the target changes, destroyed on removal. The store only tracks the
//! handle pairing; building the one-face mesh goes through the same vertex
//! synthesis as chunk geometry.

use rustc_hash::FxHashMap;
use strata_mesh::Face;

use crate::gpu::MeshHandle;
use crate::raycast::RayHit;

/// The face a [`RayHit`] selects, ready for vertex synthesis.
pub fn highlight_face(hit: &RayHit) -> Face {
    Face {
        block: hit.block,
        direction: hit.face,
        origin: hit.position,
    }
}

/// Owns the per-key highlight meshes.
#[derive(Default)]
pub struct HighlightStore {
    meshes: FxHashMap<String, MeshHandle>,
}

impl HighlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `key` to a new mesh, returning the displaced handle (which the
    /// caller must free) if the key was already bound.
    pub fn insert(&mut self, key: &str, mesh: MeshHandle) -> Option<MeshHandle> {
        self.meshes.insert(key.to_string(), mesh)
    }

    /// Unbinds `key`, returning the handle to free.
    pub fn remove(&mut self, key: &str) -> Option<MeshHandle> {
        self.meshes.remove(key)
    }

    /// All live highlight meshes, for the frame plan.
    pub fn handles(&self) -> impl Iterator<Item = MeshHandle> + '_ {
        self.meshes.values().copied()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Drops every binding, yielding the handles for release.
    pub fn drain(&mut self) -> Vec<MeshHandle> {
        self.meshes.drain().map(|(_, handle)| handle).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;
    use strata_mesh::FaceDirection;
    use strata_voxel::BlockId;

    #[test]
    fn test_highlight_face_mirrors_the_hit() {
        let hit = RayHit {
            block: BlockId(4),
            position: IVec3::new(1, 2, 3),
            face: FaceDirection::NegZ,
        };
        let face = highlight_face(&hit);
        assert_eq!(face.block, hit.block);
        assert_eq!(face.origin, hit.position);
        assert_eq!(face.direction, hit.face);
    }

    #[test]
    fn test_replace_returns_displaced_handle() {
        let mut store = HighlightStore::new();
        assert_eq!(store.insert("player", MeshHandle(1)), None);
        assert_eq!(store.insert("player", MeshHandle(2)), Some(MeshHandle(1)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.handles().collect::<Vec<_>>(), vec![MeshHandle(2)]);
    }

    #[test]
    fn test_keys_are_independent() {
        let mut store = HighlightStore::new();
        store.insert("player", MeshHandle(1));
        store.insert("spectator", MeshHandle(2));
        assert_eq!(store.len(), 2);

        assert_eq!(store.remove("player"), Some(MeshHandle(1)));
        assert_eq!(store.remove("player"), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_drain_empties_the_store() {
        let mut store = HighlightStore::new();
        store.insert("a", MeshHandle(1));
        store.insert("b", MeshHandle(2));

        let mut handles = store.drain();
        handles.sort_by_key(|h| h.0);
        assert_eq!(handles, vec![MeshHandle(1), MeshHandle(2)]);
        assert!(store.is_empty());
    }
}
