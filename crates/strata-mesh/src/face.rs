//! Face directions and the face record emitted by the mesher.

use glam::{IVec3, Vec3};
use strata_voxel::BlockId;

/// One of the six cardinal directions a voxel face can point.
///
/// The `repr(u8)` discriminant doubles as the index into per-face tables
/// (texture layers, neighbor grids, corner tables).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FaceDirection {
    /// +X direction.
    PosX = 0,
    /// -X direction.
    NegX = 1,
    /// +Y direction (up).
    PosY = 2,
    /// -Y direction (down).
    NegY = 3,
    /// +Z direction.
    PosZ = 4,
    /// -Z direction.
    NegZ = 5,
}

impl FaceDirection {
    /// All six directions in order.
    pub const ALL: [FaceDirection; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// Returns the unit step toward the neighbor voxel this face touches.
    pub const fn step(self) -> IVec3 {
        match self {
            Self::PosX => IVec3::new(1, 0, 0),
            Self::NegX => IVec3::new(-1, 0, 0),
            Self::PosY => IVec3::new(0, 1, 0),
            Self::NegY => IVec3::new(0, -1, 0),
            Self::PosZ => IVec3::new(0, 0, 1),
            Self::NegZ => IVec3::new(0, 0, -1),
        }
    }

    /// Returns the unit normal as `f32` vector.
    pub fn normal(self) -> Vec3 {
        self.step().as_vec3()
    }

    /// Returns the opposite face direction.
    pub const fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }

    /// Returns the direction index (0-5).
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One visible voxel face, the unit of mesh emission.
///
/// Carries everything needed to synthesize its 6 vertices at upload time:
/// the block type (texture lookup), the direction (winding and normal),
/// and the world-space integer origin of the voxel cube it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Face {
    /// Block type owning this face.
    pub block: BlockId,
    /// Which side of the voxel cube the face covers.
    pub direction: FaceDirection,
    /// World-space minimum corner of the owning voxel cube.
    pub origin: IVec3,
}

impl Face {
    /// World-space center point of the face, half a voxel out from the
    /// cube center along the normal. Point lights sit here.
    pub fn center(&self) -> Vec3 {
        self.origin.as_vec3() + Vec3::splat(0.5) + self.direction.normal() * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_directions_unique() {
        for (i, a) in FaceDirection::ALL.iter().enumerate() {
            for (j, b) in FaceDirection::ALL.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_opposite_is_involution() {
        for dir in FaceDirection::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.step() + dir.opposite().step(), IVec3::ZERO);
        }
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, dir) in FaceDirection::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }

    #[test]
    fn test_face_center_sits_on_face_plane() {
        let face = Face {
            block: BlockId(1),
            direction: FaceDirection::PosY,
            origin: IVec3::new(3, 5, -2),
        };
        assert_eq!(face.center(), Vec3::new(3.5, 6.0, -1.5));

        let face = Face {
            block: BlockId(1),
            direction: FaceDirection::NegX,
            origin: IVec3::new(0, 0, 0),
        };
        assert_eq!(face.center(), Vec3::new(0.0, 0.5, 0.5));
    }
}
