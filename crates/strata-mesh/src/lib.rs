//! Face-culling mesher: voxel grids in, render-ready face lists out.
//!
//! Meshing happens in two stages. [`build_mesh`] walks a chunk's voxels
//! against its six neighbor grids and emits the visible faces, bucketed
//! into solid and transparent lists plus a light-face overlay. At upload
//! time [`synthesize_vertices`] expands any face list into a triangle
//! list; the same function serves chunk meshes and the one-face block
//! highlight.

pub mod builder;
pub mod face;
pub mod vertex;
pub mod visibility;

pub use builder::{MeshBuckets, NeighborGrids, build_mesh};
pub use face::{Face, FaceDirection};
pub use vertex::{FACE_VERTEX_ATTRIBUTES, FACE_VERTEX_LAYOUT, FaceVertex, synthesize_vertices};
pub use visibility::face_visible;
