//! Face-culling mesh construction for one chunk.
//!
//! The builder walks every occupied voxel and tests its 6 faces against the
//! face-emission predicate. Boundary voxels consult the matching neighbor
//! grid; those grids are read-only borrows handed out by the chunk store,
//! so chunks never hold references to each other.

use glam::IVec3;
use strata_voxel::{BlockId, BlockRegistry, CHUNK_EDGE, VoxelGrid};

use crate::face::{Face, FaceDirection};
use crate::visibility::face_visible;

/// Read-only views of the six face-adjacent chunks' voxel grids, indexed by
/// [`FaceDirection::index`]. `None` means the chunk is not loaded and its
/// space is treated as void.
#[derive(Clone, Copy, Default)]
pub struct NeighborGrids<'a> {
    grids: [Option<&'a VoxelGrid>; 6],
}

impl<'a> NeighborGrids<'a> {
    /// No neighbors loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(grids: [Option<&'a VoxelGrid>; 6]) -> Self {
        Self { grids }
    }

    /// Sets the grid on one side. Useful when assembling from a store scan.
    pub fn set(&mut self, direction: FaceDirection, grid: &'a VoxelGrid) {
        self.grids[direction.index()] = Some(grid);
    }

    pub fn get(&self, direction: FaceDirection) -> Option<&'a VoxelGrid> {
        self.grids[direction.index()]
    }
}

/// Mesher output: faces bucketed by render pass.
///
/// `light_faces` is an overlay, not a third pass: a face of a light-emitting
/// block appears both in its transparency bucket and here.
#[derive(Clone, Debug, Default)]
pub struct MeshBuckets {
    /// Opaque faces, rendered front-to-back with depth write.
    pub solid: Vec<Face>,
    /// See-through faces, rendered back-to-front without depth write.
    pub transparent: Vec<Face>,
    /// Faces of light-emitting blocks; each becomes a candidate point light.
    pub light_faces: Vec<Face>,
}

impl MeshBuckets {
    /// Total visible faces across both render buckets.
    pub fn face_count(&self) -> usize {
        self.solid.len() + self.transparent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solid.is_empty() && self.transparent.is_empty()
    }
}

/// Builds the visible-face list for one chunk.
///
/// `origin` is the world-space position of the chunk's minimum corner; all
/// emitted face origins are world-space so vertex synthesis needs no
/// per-chunk transform.
pub fn build_mesh(
    origin: IVec3,
    registry: &BlockRegistry,
    own: &VoxelGrid,
    neighbors: &NeighborGrids<'_>,
) -> MeshBuckets {
    let mut buckets = MeshBuckets::default();

    for (x, y, z, block) in own.iter() {
        if registry.is_void(block) {
            continue;
        }
        let local = IVec3::new(x as i32, y as i32, z as i32);

        for direction in FaceDirection::ALL {
            let neighbor = neighbor_block(own, neighbors, local, direction);
            if !face_visible(registry, block, neighbor) {
                continue;
            }

            let face = Face {
                block,
                direction,
                origin: origin + local,
            };
            if registry.is_transparent(block) {
                buckets.transparent.push(face);
            } else {
                buckets.solid.push(face);
            }
            if registry.is_light(block) {
                buckets.light_faces.push(face);
            }
        }
    }

    buckets
}

/// Resolves the block behind a face: same grid for interior voxels, the
/// matching boundary grid for edge voxels. `None` when the neighbor chunk
/// is absent.
fn neighbor_block(
    own: &VoxelGrid,
    neighbors: &NeighborGrids<'_>,
    local: IVec3,
    direction: FaceDirection,
) -> Option<BlockId> {
    let edge = CHUNK_EDGE as i32;
    let at = local + direction.step();

    if at.x >= 0 && at.x < edge && at.y >= 0 && at.y < edge && at.z >= 0 && at.z < edge {
        return Some(own.get(at.x as usize, at.y as usize, at.z as usize));
    }

    // Exactly one axis is out of range, by exactly one voxel.
    neighbors.get(direction).map(|grid| {
        grid.get(
            at.x.rem_euclid(edge) as usize,
            at.y.rem_euclid(edge) as usize,
            at.z.rem_euclid(edge) as usize,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_voxel::{BlockDef, FaceTextures};

    fn test_registry() -> (BlockRegistry, BlockId, BlockId, BlockId, BlockId) {
        let mut registry = BlockRegistry::new();
        let stone = registry
            .register(BlockDef::solid("stone", FaceTextures::uniform(1)))
            .unwrap();
        let glass = registry
            .register(BlockDef::transparent("glass", FaceTextures::uniform(2)))
            .unwrap();
        let water = registry
            .register(BlockDef::transparent("water", FaceTextures::uniform(3)))
            .unwrap();
        let lamp = registry
            .register(BlockDef::luminous("lamp", FaceTextures::uniform(4)))
            .unwrap();
        (registry, stone, glass, water, lamp)
    }

    fn boundary_face(buckets: &[Face], origin: IVec3, direction: FaceDirection) -> usize {
        buckets
            .iter()
            .filter(|f| f.origin == origin && f.direction == direction)
            .count()
    }

    #[test]
    fn test_empty_grid_produces_no_faces() {
        let (registry, _, _, _, _) = test_registry();
        let grid = VoxelGrid::new_air();
        let buckets = build_mesh(IVec3::ZERO, &registry, &grid, &NeighborGrids::empty());
        assert!(buckets.is_empty());
        assert!(buckets.light_faces.is_empty());
    }

    #[test]
    fn test_lone_voxel_emits_six_solid_faces() {
        let (registry, stone, _, _, _) = test_registry();
        let mut grid = VoxelGrid::new_air();
        grid.set(5, 5, 5, stone);
        let buckets = build_mesh(IVec3::ZERO, &registry, &grid, &NeighborGrids::empty());
        assert_eq!(buckets.solid.len(), 6);
        assert!(buckets.transparent.is_empty());
    }

    #[test]
    fn test_stacked_voxels_cull_shared_faces() {
        let (registry, stone, _, _, _) = test_registry();
        let mut grid = VoxelGrid::new_air();
        grid.set(5, 5, 5, stone);
        grid.set(5, 6, 5, stone);
        let buckets = build_mesh(IVec3::ZERO, &registry, &grid, &NeighborGrids::empty());
        // 12 faces minus the two shared ones.
        assert_eq!(buckets.solid.len(), 10);
        assert_eq!(
            boundary_face(&buckets.solid, IVec3::new(5, 5, 5), FaceDirection::PosY),
            0
        );
        assert_eq!(
            boundary_face(&buckets.solid, IVec3::new(5, 6, 5), FaceDirection::NegY),
            0
        );
    }

    #[test]
    fn test_stone_glass_boundary_one_solid_face_owned_by_stone() {
        let (registry, stone, glass, _, _) = test_registry();
        let mut grid = VoxelGrid::new_air();
        grid.set(4, 5, 5, stone);
        grid.set(5, 5, 5, glass);
        let buckets = build_mesh(IVec3::ZERO, &registry, &grid, &NeighborGrids::empty());

        // Stone's side of the shared plane is the only solid face there.
        assert_eq!(
            boundary_face(&buckets.solid, IVec3::new(4, 5, 5), FaceDirection::PosX),
            1
        );
        assert_eq!(
            boundary_face(&buckets.solid, IVec3::new(5, 5, 5), FaceDirection::NegX),
            0
        );
        // Glass's side shows in the transparent bucket.
        assert_eq!(
            boundary_face(&buckets.transparent, IVec3::new(5, 5, 5), FaceDirection::NegX),
            1
        );
    }

    #[test]
    fn test_same_type_transparent_boundary_has_no_faces() {
        let (registry, _, glass, _, _) = test_registry();
        let mut grid = VoxelGrid::new_air();
        grid.set(4, 5, 5, glass);
        grid.set(5, 5, 5, glass);
        let buckets = build_mesh(IVec3::ZERO, &registry, &grid, &NeighborGrids::empty());
        assert_eq!(
            boundary_face(&buckets.transparent, IVec3::new(4, 5, 5), FaceDirection::PosX),
            0
        );
        assert_eq!(
            boundary_face(&buckets.transparent, IVec3::new(5, 5, 5), FaceDirection::NegX),
            0
        );
    }

    #[test]
    fn test_different_transparent_types_show_both_boundary_faces() {
        let (registry, _, glass, water, _) = test_registry();
        let mut grid = VoxelGrid::new_air();
        grid.set(4, 5, 5, glass);
        grid.set(5, 5, 5, water);
        let buckets = build_mesh(IVec3::ZERO, &registry, &grid, &NeighborGrids::empty());
        assert_eq!(
            boundary_face(&buckets.transparent, IVec3::new(4, 5, 5), FaceDirection::PosX),
            1
        );
        assert_eq!(
            boundary_face(&buckets.transparent, IVec3::new(5, 5, 5), FaceDirection::NegX),
            1
        );
    }

    #[test]
    fn test_light_faces_mirror_the_solid_bucket_for_lamps() {
        let (registry, _, _, _, lamp) = test_registry();
        let mut grid = VoxelGrid::new_air();
        grid.set(5, 5, 5, lamp);
        let buckets = build_mesh(IVec3::ZERO, &registry, &grid, &NeighborGrids::empty());
        assert_eq!(buckets.solid.len(), 6);
        assert_eq!(buckets.light_faces.len(), 6);
        assert_eq!(buckets.light_faces, buckets.solid);
    }

    #[test]
    fn test_buried_lamp_emits_no_light_faces() {
        let (registry, stone, _, _, lamp) = test_registry();
        let mut grid = VoxelGrid::new_air();
        grid.set(5, 5, 5, lamp);
        for direction in FaceDirection::ALL {
            let at = IVec3::new(5, 5, 5) + direction.step();
            grid.set(at.x as usize, at.y as usize, at.z as usize, stone);
        }
        let buckets = build_mesh(IVec3::ZERO, &registry, &grid, &NeighborGrids::empty());
        assert!(buckets.light_faces.is_empty());
    }

    #[test]
    fn test_chunk_boundary_consults_neighbor_grid() {
        let (registry, stone, _, _, _) = test_registry();
        let edge = CHUNK_EDGE - 1;
        let mut own = VoxelGrid::new_air();
        own.set(edge, 5, 5, stone);

        // Occupied neighbor cell across the +X boundary culls the face.
        let mut plus_x = VoxelGrid::new_air();
        plus_x.set(0, 5, 5, stone);
        let mut neighbors = NeighborGrids::empty();
        neighbors.set(FaceDirection::PosX, &plus_x);

        let buckets = build_mesh(IVec3::ZERO, &registry, &own, &neighbors);
        assert_eq!(
            boundary_face(
                &buckets.solid,
                IVec3::new(edge as i32, 5, 5),
                FaceDirection::PosX
            ),
            0
        );
    }

    #[test]
    fn test_absent_neighbor_chunk_exposes_boundary_face() {
        let (registry, stone, _, _, _) = test_registry();
        let edge = CHUNK_EDGE - 1;
        let mut own = VoxelGrid::new_air();
        own.set(edge, 5, 5, stone);

        let buckets = build_mesh(IVec3::ZERO, &registry, &own, &NeighborGrids::empty());
        assert_eq!(
            boundary_face(
                &buckets.solid,
                IVec3::new(edge as i32, 5, 5),
                FaceDirection::PosX
            ),
            1
        );
    }

    #[test]
    fn test_world_origin_offsets_face_origins() {
        let (registry, stone, _, _, _) = test_registry();
        let mut grid = VoxelGrid::new_air();
        grid.set(0, 0, 0, stone);
        let origin = IVec3::new(-32, 16, 48);
        let buckets = build_mesh(origin, &registry, &grid, &NeighborGrids::empty());
        for face in &buckets.solid {
            assert_eq!(face.origin, origin);
        }
    }
}
