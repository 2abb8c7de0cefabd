//! Vertex synthesis: face records → GPU-ready triangle lists.
//!
//! Synthesis is a pure function of a face list, shared between chunk meshes
//! and the single-face highlight mesh. Every face becomes 6 vertices (two
//! triangles), wound counter-clockwise when viewed from outside the block.

use std::mem;

use strata_voxel::BlockRegistry;
use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use crate::face::Face;

/// A single mesh vertex, 36 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FaceVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Face normal.
    pub normal: [f32; 3],
    /// Texture coordinates within the face.
    pub uv: [f32; 2],
    /// Texture-array layer for the face's material.
    pub layer: u32,
}

static_assertions::assert_eq_size!(FaceVertex, [u8; 36]);

/// Vertex attributes for all chunk-geometry render pipelines.
pub const FACE_VERTEX_ATTRIBUTES: [VertexAttribute; 4] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 12,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 24,
        shader_location: 2,
    },
    VertexAttribute {
        format: VertexFormat::Uint32,
        offset: 32,
        shader_location: 3,
    },
];

/// The vertex buffer layout shared by the chunk, shadow, and highlight
/// pipelines. All of them reference this one constant to avoid layout
/// drift bugs.
pub const FACE_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<FaceVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &FACE_VERTEX_ATTRIBUTES,
};

const _: () = assert!(mem::size_of::<FaceVertex>() == 36);
const _: () = assert!(FACE_VERTEX_ATTRIBUTES[1].offset == 12);
const _: () = assert!(FACE_VERTEX_ATTRIBUTES[2].offset == 24);
const _: () = assert!(FACE_VERTEX_ATTRIBUTES[3].offset == 32);

/// Corner offsets within the unit cube and their UVs, per face direction,
/// in counter-clockwise order viewed from outside. Indexed by
/// [`crate::FaceDirection::index`].
const FACE_CORNERS: [[([i32; 3], [f32; 2]); 4]; 6] = [
    // +X
    [
        ([1, 0, 0], [1.0, 1.0]),
        ([1, 1, 0], [1.0, 0.0]),
        ([1, 1, 1], [0.0, 0.0]),
        ([1, 0, 1], [0.0, 1.0]),
    ],
    // -X
    [
        ([0, 0, 0], [0.0, 1.0]),
        ([0, 0, 1], [1.0, 1.0]),
        ([0, 1, 1], [1.0, 0.0]),
        ([0, 1, 0], [0.0, 0.0]),
    ],
    // +Y
    [
        ([0, 1, 0], [0.0, 0.0]),
        ([0, 1, 1], [0.0, 1.0]),
        ([1, 1, 1], [1.0, 1.0]),
        ([1, 1, 0], [1.0, 0.0]),
    ],
    // -Y
    [
        ([0, 0, 0], [1.0, 0.0]),
        ([1, 0, 0], [0.0, 0.0]),
        ([1, 0, 1], [0.0, 1.0]),
        ([0, 0, 1], [1.0, 1.0]),
    ],
    // +Z
    [
        ([0, 0, 1], [0.0, 1.0]),
        ([1, 0, 1], [1.0, 1.0]),
        ([1, 1, 1], [1.0, 0.0]),
        ([0, 1, 1], [0.0, 0.0]),
    ],
    // -Z
    [
        ([0, 0, 0], [1.0, 1.0]),
        ([0, 1, 0], [1.0, 0.0]),
        ([1, 1, 0], [0.0, 0.0]),
        ([1, 0, 0], [0.0, 1.0]),
    ],
];

/// Both triangles of the quad, as indices into [`FACE_CORNERS`].
const FACE_TRIANGLES: [usize; 6] = [0, 1, 2, 0, 2, 3];

/// Expands faces into a triangle list, 6 vertices per face.
pub fn synthesize_vertices(faces: &[Face], registry: &BlockRegistry) -> Vec<FaceVertex> {
    let mut vertices = Vec::with_capacity(faces.len() * 6);

    for face in faces {
        let def = registry.def(face.block);
        let layer = def
            .textures
            .map_or(0, |t| u32::from(t.layers[face.direction.index()]));
        let normal = face.direction.normal().to_array();
        let corners = &FACE_CORNERS[face.direction.index()];

        for &corner in &FACE_TRIANGLES {
            let (offset, uv) = corners[corner];
            vertices.push(FaceVertex {
                position: [
                    (face.origin.x + offset[0]) as f32,
                    (face.origin.y + offset[1]) as f32,
                    (face.origin.z + offset[2]) as f32,
                ],
                normal,
                uv,
                layer,
            });
        }
    }

    vertices
}
