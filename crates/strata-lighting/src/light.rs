//! Per-face point lights: light-space projection, GPU layout, and the
//! slot reconciliation that keeps a chunk's lights bound across rebuilds.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use strata_mesh::{Face, FaceDirection};

use crate::slot::{ShadowSlot, ShadowSlotPool};

/// Field of view of a face light's shadow frustum.
pub const LIGHT_FOV: f32 = std::f32::consts::FRAC_PI_2;
/// Near plane, just past the emitting face.
pub const LIGHT_NEAR: f32 = 0.05;
/// Far plane / radius of effect, a few chunk-widths out.
pub const LIGHT_RANGE: f32 = 48.0;
/// How far the light eye sits off the face, to keep the emitting block's
/// own surface out of its shadow frustum.
const EYE_OFFSET: f32 = 0.02;

/// Builds the light-space view-projection for one emitting face.
///
/// The light looks outward along the face normal with a square 90 degree
/// frustum. Near and far are swapped in the projection: depth is reverse-Z
/// everywhere, matching the shadow comparison sampler.
pub fn light_view_projection(face: &Face) -> Mat4 {
    let normal = face.direction.normal();
    let eye = face.center() + normal * EYE_OFFSET;
    let up = match face.direction {
        // A vertical normal is parallel to the usual up axis.
        FaceDirection::PosY | FaceDirection::NegY => Vec3::Z,
        _ => Vec3::Y,
    };
    let view = Mat4::look_to_rh(eye, normal, up);
    let proj = Mat4::perspective_rh(LIGHT_FOV, 1.0, LIGHT_RANGE, LIGHT_NEAR);
    proj * view
}

/// Per-light GPU record, 96 bytes, std430-compatible.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightGpu {
    /// Light-space view-projection matrix (column-major).
    pub view_proj: [f32; 16],
    /// xyz = world position, w = radius of effect.
    pub position_range: [f32; 4],
    /// xyz = linear RGB color, w = intensity.
    pub color_intensity: [f32; 4],
}

impl LightGpu {
    /// Builds the GPU record for one emitting face.
    pub fn from_face(face: &Face) -> Self {
        let center = face.center();
        Self {
            view_proj: light_view_projection(face).to_cols_array(),
            position_range: [center.x, center.y, center.z, LIGHT_RANGE],
            color_intensity: [1.0, 0.86, 0.64, 6.0],
        }
    }
}

/// A light face currently bound to a shadow slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundLight {
    pub slot: ShadowSlot,
    pub face: Face,
}

/// Reconciles a chunk's held slots against its freshly meshed light faces.
///
/// Matching is positional: entries that line up by list index keep their
/// slot and take the new face, slots past the end of the new list are
/// released, and new entries past the end of the held list acquire fresh
/// slots. When the pool runs dry the remaining faces are skipped and cast
/// no light; they are re-attempted the next time the chunk's lighting is
/// rebuilt, not when slots happen to free up.
///
/// Returns `true` if any slot was released or acquired, meaning the set of
/// slot indices relevant to this chunk and its neighbors has changed.
pub fn reconcile_slots(
    pool: &mut ShadowSlotPool,
    held: &mut Vec<BoundLight>,
    faces: &[Face],
) -> bool {
    let mut changed = false;

    // Shared prefix: same slot, possibly a different face.
    let shared = held.len().min(faces.len());
    for (bound, face) in held.iter_mut().zip(faces) {
        bound.face = *face;
    }

    if held.len() > faces.len() {
        for bound in held.drain(faces.len()..) {
            pool.release(bound.slot);
        }
        changed = true;
    }

    for face in &faces[shared..] {
        match pool.acquire() {
            Some(slot) => {
                held.push(BoundLight { slot, face: *face });
                changed = true;
            }
            None => {
                tracing::warn!(
                    wanted = faces.len(),
                    bound = held.len(),
                    "shadow slot pool exhausted, skipping remaining light faces"
                );
                break;
            }
        }
    }

    changed
}
