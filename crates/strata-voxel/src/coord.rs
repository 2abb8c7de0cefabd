//! Chunk-space coordinates and world ↔ chunk translation.
//!
//! A [`ChunkCoord`] is the stable key for the chunk map: three exact
//! integers, hashed and compared as integers. World positions convert with
//! floored division so negative coordinates land in the right chunk.

use glam::{IVec3, Vec3};

use crate::grid::CHUNK_EDGE;

/// Identifies one chunk in chunk space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk containing an integer world coordinate (floored division).
    pub fn of_world(world: IVec3) -> Self {
        let edge = CHUNK_EDGE as i32;
        Self {
            x: world.x.div_euclid(edge),
            y: world.y.div_euclid(edge),
            z: world.z.div_euclid(edge),
        }
    }

    /// Chunk containing a continuous world position.
    pub fn containing(point: Vec3) -> Self {
        Self::of_world(point.floor().as_ivec3())
    }

    /// World coordinate of this chunk's minimum-corner voxel.
    pub fn world_origin(self) -> IVec3 {
        let edge = CHUNK_EDGE as i32;
        IVec3::new(self.x * edge, self.y * edge, self.z * edge)
    }

    /// Translated copy.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The six face-adjacent neighbor coordinates.
    pub fn face_neighbors(self) -> [ChunkCoord; 6] {
        [
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
            self.offset(0, 1, 0),
            self.offset(0, -1, 0),
            self.offset(0, 0, 1),
            self.offset(0, 0, -1),
        ]
    }

    /// All 26 neighbors in the surrounding 3×3×3 shell.
    pub fn moore_neighbors(self) -> [ChunkCoord; 26] {
        let mut out = [self; 26];
        let mut i = 0;
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    out[i] = self.offset(dx, dy, dz);
                    i += 1;
                }
            }
        }
        out
    }

    /// Squared Euclidean distance to another chunk, in chunk units.
    pub fn distance_sq(self, other: ChunkCoord) -> u64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        (dx * dx + dy * dy + dz * dz) as u64
    }
}

/// Splits an integer world coordinate into its owning chunk and the local
/// voxel coordinate within that chunk.
pub fn split_world(world: IVec3) -> (ChunkCoord, (usize, usize, usize)) {
    let edge = CHUNK_EDGE as i32;
    let chunk = ChunkCoord::of_world(world);
    let local = (
        world.x.rem_euclid(edge) as usize,
        world.y.rem_euclid(edge) as usize,
        world.z.rem_euclid(edge) as usize,
    );
    (chunk, local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_origin_roundtrip() {
        let coord = ChunkCoord::new(2, -1, 3);
        assert_eq!(ChunkCoord::of_world(coord.world_origin()), coord);
    }

    #[test]
    fn test_negative_world_coords_floor_correctly() {
        // World x = -1 belongs to chunk -1, local 15 — not chunk 0.
        let (chunk, local) = split_world(IVec3::new(-1, 0, 0));
        assert_eq!(chunk, ChunkCoord::new(-1, 0, 0));
        assert_eq!(local, (CHUNK_EDGE - 1, 0, 0));
    }

    #[test]
    fn test_split_world_covers_full_chunk() {
        let (chunk, local) = split_world(IVec3::new(16, 31, 0));
        assert_eq!(chunk, ChunkCoord::new(1, 1, 0));
        assert_eq!(local, (0, 15, 0));
    }

    #[test]
    fn test_containing_floors_continuous_positions() {
        assert_eq!(
            ChunkCoord::containing(Vec3::new(0.5, 0.5, 0.5)),
            ChunkCoord::new(0, 0, 0)
        );
        assert_eq!(
            ChunkCoord::containing(Vec3::new(-0.5, 17.0, -16.0)),
            ChunkCoord::new(-1, 1, -1)
        );
    }

    #[test]
    fn test_face_neighbors_are_distance_one() {
        let c = ChunkCoord::new(4, 5, 6);
        for n in c.face_neighbors() {
            assert_eq!(c.distance_sq(n), 1);
        }
    }

    #[test]
    fn test_moore_neighbors_are_unique_and_exclude_self() {
        let c = ChunkCoord::new(0, 0, 0);
        let neighbors = c.moore_neighbors();
        assert_eq!(neighbors.len(), 26);
        for (i, a) in neighbors.iter().enumerate() {
            assert_ne!(*a, c);
            for b in &neighbors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_distance_sq_is_symmetric() {
        let a = ChunkCoord::new(-3, 2, 7);
        let b = ChunkCoord::new(1, -1, 0);
        assert_eq!(a.distance_sq(b), b.distance_sq(a));
        assert_eq!(a.distance_sq(a), 0);
    }
}
