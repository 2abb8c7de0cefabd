//! The arena of loaded chunks.
//!
//! Chunks are owned by this map and nothing else; neighbors are reached by
//! coordinate lookup, never by reference, so there are no chunk-to-chunk
//! links to keep consistent. Beside the map sits the service roster: the
//! same coordinates in insertion order (ascending distance at insert time),
//! which is the order the scheduler walks.

use rustc_hash::FxHashMap;
use strata_mesh::{FaceDirection, NeighborGrids};
use strata_voxel::{BlockId, ChunkCoord, VoxelGrid, split_world};

use crate::chunk::Chunk;

/// Owns every loaded chunk, keyed by exact-integer coordinate.
#[derive(Default)]
pub struct ChunkStore {
    chunks: FxHashMap<ChunkCoord, Chunk>,
    /// Scheduler walk order. Mirrors the map's key set exactly.
    roster: Vec<ChunkCoord>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an empty placeholder and appends it to the roster.
    ///
    /// No-op if the coordinate is already loaded, so re-entering the load
    /// set never resets an existing chunk.
    pub fn insert_placeholder(&mut self, coord: ChunkCoord) -> bool {
        if self.chunks.contains_key(&coord) {
            return false;
        }
        self.chunks.insert(coord, Chunk::new());
        self.roster.push(coord);
        true
    }

    /// Removes a chunk, handing its carcass back for resource release.
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        let chunk = self.chunks.remove(&coord)?;
        self.roster.retain(|c| *c != coord);
        Some(chunk)
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Insertion-ordered coordinates for the scheduler walk.
    pub fn roster(&self) -> &[ChunkCoord] {
        &self.roster
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &Chunk)> {
        self.chunks.iter()
    }

    /// Read-only views of the six face-adjacent grids around `coord`.
    /// Absent or not-yet-generated neighbors read as unloaded.
    pub fn neighbor_grids(&self, coord: ChunkCoord) -> NeighborGrids<'_> {
        let mut neighbors = NeighborGrids::empty();
        for direction in FaceDirection::ALL {
            let step = direction.step();
            let neighbor = coord.offset(step.x, step.y, step.z);
            if let Some(grid) = self.chunks.get(&neighbor).and_then(Chunk::blocks) {
                neighbors.set(direction, grid);
            }
        }
        neighbors
    }

    /// The mesh gate: every face-adjacent chunk that is in the load set
    /// must have generated blocks before this chunk may mesh. Neighbors
    /// outside the set count as void and do not block.
    pub fn face_neighbors_generated(&self, coord: ChunkCoord) -> bool {
        coord.face_neighbors().iter().all(|neighbor| {
            match self.chunks.get(neighbor) {
                Some(chunk) => chunk.blocks().is_some(),
                None => true,
            }
        })
    }

    /// Block lookup by world coordinate. `None` is the unloaded sentinel:
    /// the chunk is absent or has not generated yet.
    pub fn block_at(&self, world: glam::IVec3) -> Option<BlockId> {
        let (coord, (x, y, z)) = split_world(world);
        let grid: &VoxelGrid = self.chunks.get(&coord)?.blocks()?;
        Some(grid.get(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;
    use strata_voxel::CHUNK_EDGE;

    fn generated(id: BlockId) -> Chunk {
        let mut chunk = Chunk::new();
        chunk.install_blocks(VoxelGrid::filled(id));
        chunk
    }

    fn store_with_generated(coords: &[ChunkCoord]) -> ChunkStore {
        let mut store = ChunkStore::new();
        for &coord in coords {
            store.insert_placeholder(coord);
            store
                .get_mut(coord)
                .unwrap()
                .install_blocks(VoxelGrid::new_air());
        }
        store
    }

    #[test]
    fn test_placeholder_insert_is_idempotent() {
        let mut store = ChunkStore::new();
        let coord = ChunkCoord::new(1, 2, 3);
        assert!(store.insert_placeholder(coord));
        store.get_mut(coord).unwrap().install_blocks(VoxelGrid::new_air());

        assert!(!store.insert_placeholder(coord));
        assert!(store.get(coord).unwrap().blocks().is_some(), "not reset");
        assert_eq!(store.roster().len(), 1);
    }

    #[test]
    fn test_remove_drops_roster_entry() {
        let mut store = ChunkStore::new();
        let a = ChunkCoord::new(0, 0, 0);
        let b = ChunkCoord::new(1, 0, 0);
        store.insert_placeholder(a);
        store.insert_placeholder(b);

        assert!(store.remove(a).is_some());
        assert!(store.remove(a).is_none());
        assert_eq!(store.roster(), &[b]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_roster_preserves_insertion_order() {
        let mut store = ChunkStore::new();
        let coords = [
            ChunkCoord::new(0, 0, 0),
            ChunkCoord::new(1, 0, 0),
            ChunkCoord::new(0, 1, 0),
        ];
        for &coord in &coords {
            store.insert_placeholder(coord);
        }
        assert_eq!(store.roster(), &coords);
    }

    #[test]
    fn test_block_at_unloaded_is_none() {
        let mut store = ChunkStore::new();
        assert_eq!(store.block_at(IVec3::new(5, 5, 5)), None);

        // Placeholder without blocks still reads as unloaded.
        store.insert_placeholder(ChunkCoord::new(0, 0, 0));
        assert_eq!(store.block_at(IVec3::new(5, 5, 5)), None);
    }

    #[test]
    fn test_block_at_translates_negative_coordinates() {
        let mut store = ChunkStore::new();
        let coord = ChunkCoord::new(-1, 0, 0);
        store.insert_placeholder(coord);
        let stone = BlockId(3);
        let mut grid = VoxelGrid::new_air();
        grid.set(CHUNK_EDGE - 1, 0, 0, stone);
        store.get_mut(coord).unwrap().install_blocks(grid);

        assert_eq!(store.block_at(IVec3::new(-1, 0, 0)), Some(stone));
        assert_eq!(store.block_at(IVec3::new(-2, 0, 0)), Some(BlockId::AIR));
    }

    #[test]
    fn test_neighbor_grids_only_cover_generated_chunks() {
        let center = ChunkCoord::new(0, 0, 0);
        let mut store = store_with_generated(&[center]);
        store.insert_placeholder(ChunkCoord::new(1, 0, 0)); // empty placeholder

        store.insert_placeholder(ChunkCoord::new(-1, 0, 0));
        *store.get_mut(ChunkCoord::new(-1, 0, 0)).unwrap() = generated(BlockId(9));

        let neighbors = store.neighbor_grids(center);
        assert!(neighbors.get(FaceDirection::PosX).is_none(), "placeholder");
        assert!(neighbors.get(FaceDirection::NegX).is_some(), "generated");
        assert!(neighbors.get(FaceDirection::PosY).is_none(), "absent");
    }

    #[test]
    fn test_mesh_gate_ignores_absent_neighbors() {
        let center = ChunkCoord::new(0, 0, 0);
        let mut store = store_with_generated(&[center]);

        // No loaded neighbors at all: gate passes.
        assert!(store.face_neighbors_generated(center));

        // A loaded but empty neighbor blocks the gate.
        store.insert_placeholder(ChunkCoord::new(0, 1, 0));
        assert!(!store.face_neighbors_generated(center));

        store
            .get_mut(ChunkCoord::new(0, 1, 0))
            .unwrap()
            .install_blocks(VoxelGrid::new_air());
        assert!(store.face_neighbors_generated(center));
    }
}
