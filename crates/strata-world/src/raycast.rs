//! Block picking by Amanatides–Woo voxel traversal.
//!
//! The ray walks the integer grid one cell boundary at a time, always
//! crossing the nearest boundary next, until it enters a pointable block,
//! runs out of distance budget, or reaches unloaded space (nothing beyond
//! the edge of loaded data can be seen, so the walk stops there).

use glam::{IVec3, Vec3};
use strata_mesh::FaceDirection;
use strata_voxel::BlockId;

/// Read-only block lookup the traversal runs against. The world implements
/// this over its chunk store; tests use a hash map.
pub trait BlockView {
    /// Block at an integer world coordinate, or `None` for unloaded space.
    fn block_at(&self, world: IVec3) -> Option<BlockId>;

    /// Whether the ray may select this block type.
    fn is_pointable(&self, id: BlockId) -> bool;
}

/// A successful pick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayHit {
    /// The picked block's type.
    pub block: BlockId,
    /// World coordinate of the picked voxel.
    pub position: IVec3,
    /// Which face of the voxel the ray entered through.
    pub face: FaceDirection,
}

/// Parametric distance along one axis to the next integer boundary.
///
/// For a negative step the boundary behind `s` is `floor(s)`; when `s` is
/// already exactly integer that boundary is zero distance away and the
/// first crossing happens immediately.
fn intbound(s: f32, ds: f32) -> f32 {
    if ds == 0.0 {
        f32::INFINITY
    } else if ds < 0.0 {
        (s - s.floor()) / -ds
    } else {
        (1.0 + s.floor() - s) / ds
    }
}

/// Casts a ray and returns the first pointable block it enters.
///
/// `max_distance` is in world units; `direction` need not be normalized
/// but must be non-zero (asserted — a zero direction is a caller bug, not
/// a runtime condition). The origin's own cell is never reported: a hit is
/// defined by the face crossed into it, and no face was crossed to reach
/// the origin.
pub fn cast_ray(
    view: &impl BlockView,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> Option<RayHit> {
    assert!(
        direction != Vec3::ZERO,
        "ray direction must be non-zero"
    );

    let mut cell = origin.floor().as_ivec3();
    let step = IVec3::new(
        direction.x.signum() as i32,
        direction.y.signum() as i32,
        direction.z.signum() as i32,
    );

    // Parameter cost of crossing one full cell per axis, and the parameter
    // of the first boundary crossing per axis.
    let t_delta = Vec3::new(
        safe_inv(direction.x.abs()),
        safe_inv(direction.y.abs()),
        safe_inv(direction.z.abs()),
    );
    let mut t_max = Vec3::new(
        intbound(origin.x, direction.x),
        intbound(origin.y, direction.y),
        intbound(origin.z, direction.z),
    );

    // The parameter t measures multiples of `direction`; rescale the world
    // distance budget into those units.
    let t_limit = max_distance / direction.length();

    loop {
        // Cross the nearest boundary.
        let (t, entered) = if t_max.x < t_max.y && t_max.x < t_max.z {
            let t = t_max.x;
            t_max.x += t_delta.x;
            cell.x += step.x;
            (t, if step.x > 0 { FaceDirection::NegX } else { FaceDirection::PosX })
        } else if t_max.y < t_max.z {
            let t = t_max.y;
            t_max.y += t_delta.y;
            cell.y += step.y;
            (t, if step.y > 0 { FaceDirection::NegY } else { FaceDirection::PosY })
        } else {
            let t = t_max.z;
            t_max.z += t_delta.z;
            cell.z += step.z;
            (t, if step.z > 0 { FaceDirection::NegZ } else { FaceDirection::PosZ })
        };

        if t > t_limit {
            return None;
        }

        match view.block_at(cell) {
            // Cannot see past the edge of loaded data.
            None => return None,
            Some(id) if view.is_pointable(id) => {
                return Some(RayHit {
                    block: id,
                    position: cell,
                    face: entered,
                });
            }
            Some(_) => {}
        }
    }
}

fn safe_inv(x: f32) -> f32 {
    if x == 0.0 { f32::INFINITY } else { 1.0 / x }
}
