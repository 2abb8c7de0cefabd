//! Dense voxel storage for a single chunk.
//!
//! A grid is a fixed `CHUNK_EDGE³` array of [`BlockId`]s in row-major order
//! (x varies fastest). Grids are produced whole by the terrain generator and
//! afterwards only change through explicit single-voxel writes.

use crate::registry::BlockId;

/// Edge length of a cubic chunk, in voxels.
pub const CHUNK_EDGE: usize = 16;

/// Number of voxels in one chunk.
pub const CHUNK_VOLUME: usize = CHUNK_EDGE * CHUNK_EDGE * CHUNK_EDGE;

/// Flattened row-major index: `x + y * EDGE + z * EDGE²`.
#[inline]
pub fn linear_index(x: usize, y: usize, z: usize) -> usize {
    debug_assert!(
        x < CHUNK_EDGE && y < CHUNK_EDGE && z < CHUNK_EDGE,
        "voxel index out of bounds: ({x}, {y}, {z})"
    );
    x + y * CHUNK_EDGE + z * CHUNK_EDGE * CHUNK_EDGE
}

/// Dense block-id array for one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    voxels: Box<[BlockId]>,
}

impl VoxelGrid {
    /// Creates a grid filled with air (id 0).
    pub fn new_air() -> Self {
        Self::filled(BlockId::AIR)
    }

    /// Creates a grid where every voxel holds `id`.
    pub fn filled(id: BlockId) -> Self {
        Self {
            voxels: vec![id; CHUNK_VOLUME].into_boxed_slice(),
        }
    }

    /// Returns the block id at a local coordinate.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.voxels[linear_index(x, y, z)]
    }

    /// Writes the block id at a local coordinate.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, id: BlockId) {
        self.voxels[linear_index(x, y, z)] = id;
    }

    /// Iterates every voxel as `(x, y, z, id)` in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize, BlockId)> + '_ {
        self.voxels.iter().enumerate().map(|(i, &id)| {
            let x = i % CHUNK_EDGE;
            let y = (i / CHUNK_EDGE) % CHUNK_EDGE;
            let z = i / (CHUNK_EDGE * CHUNK_EDGE);
            (x, y, z, id)
        })
    }

    /// Returns `true` if every voxel holds `id`.
    pub fn is_uniform(&self, id: BlockId) -> bool {
        self.voxels.iter().all(|&v| v == id)
    }

    /// Raw storage view, row-major.
    pub fn as_slice(&self) -> &[BlockId] {
        &self.voxels
    }
}
