//! Procedural terrain generation for the streaming voxel world.
//!
//! Generation is a pure function of (seed, chunk coordinate): the same
//! inputs always produce bit-identical voxel grids, so chunks can be
//! evicted and regenerated freely, and adjacent chunks agree at their
//! shared boundary without any cross-chunk communication.

mod generator;

pub use generator::{TerrainGenerator, TerrainPalette, TerrainParams};
