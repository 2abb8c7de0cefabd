//! Voxel fundamentals for the Strata engine: chunk-space coordinates, the
//! dense per-chunk voxel grid, and the block type registry.
//!
//! Everything here is plain data with exact-integer semantics; the streaming
//! scheduler, mesher, and lighting layers build on these types.

pub mod coord;
pub mod grid;
pub mod registry;

pub use coord::{ChunkCoord, split_world};
pub use grid::{CHUNK_EDGE, CHUNK_VOLUME, VoxelGrid, linear_index};
pub use registry::{BlockDef, BlockId, BlockRegistry, FaceTextures, RegistryError};
