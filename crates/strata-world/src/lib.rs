//! The streaming voxel world.
//!
//! [`World`] owns the loaded chunks and drives each one up the pipeline —
//! generate, mesh, upload, light — under a per-frame stage budget, keyed
//! off a moving viewpoint with hysteresis between the load and evict
//! radii. It talks to graphics only through the [`WorldGpu`] trait, so the
//! whole lifecycle runs headless under test against a counting fake.
//!
//! Interaction lives here too: [`cast_ray`] picks blocks by grid
//! traversal, [`World::set_block`] edits them with immediate visibility,
//! and keyed highlights outline whatever a player points at.

pub mod chunk;
pub mod gpu;
pub mod highlight;
pub mod raycast;
pub mod store;
pub mod stream;
pub mod world;

pub use chunk::{Chunk, ChunkGraphics, ChunkStage};
pub use gpu::{DrawItem, FramePlan, MAX_LIGHTS_PER_DRAW, MeshHandle, WorldGpu};
pub use highlight::HighlightStore;
pub use raycast::{BlockView, RayHit, cast_ray};
pub use store::ChunkStore;
pub use stream::{StreamConfig, load_set};
pub use world::{UpdateStats, World, WorldConfig};
