//! Per-chunk pipeline state.
//!
//! A chunk climbs a ladder of stages: `Empty → Generated → Meshed →
//! Uploaded → Lit`. Each variant carries exactly the data its stage has
//! produced, so a lit-but-never-meshed chunk cannot be represented. "Absent
//! from the map" is the unloaded state; no variant spells it.
//!
//! Staleness is tracked beside the ladder: a stage that exists but no
//! longer reflects its upstream input keeps its data and sets a flag, and
//! the scheduler rebuilds it in place on a later visit.

use std::mem;

use strata_lighting::BoundLight;
use strata_mesh::MeshBuckets;
use strata_voxel::VoxelGrid;

use crate::gpu::MeshHandle;

/// GPU vertex buffers for one chunk, one per render bucket.
///
/// `None` means the bucket meshed to zero faces and no buffer was created.
#[derive(Debug, Default)]
pub struct ChunkGraphics {
    pub solid: Option<MeshHandle>,
    pub transparent: Option<MeshHandle>,
}

/// The pipeline ladder. Later variants carry everything earlier ones do.
#[derive(Debug, Default)]
pub enum ChunkStage {
    /// Placeholder inserted when the coordinate entered the load set.
    #[default]
    Empty,
    /// Terrain has been generated.
    Generated { blocks: VoxelGrid },
    /// Visible faces have been extracted.
    Meshed { blocks: VoxelGrid, mesh: MeshBuckets },
    /// Vertex buffers exist on the GPU.
    Uploaded {
        blocks: VoxelGrid,
        mesh: MeshBuckets,
        graphics: ChunkGraphics,
    },
    /// Light faces are bound to shadow slots.
    Lit {
        blocks: VoxelGrid,
        mesh: MeshBuckets,
        graphics: ChunkGraphics,
        lights: Vec<BoundLight>,
    },
}

/// One streamed chunk: its pipeline stage, staleness flags, and the cached
/// list of shadow slots relevant to its geometry.
#[derive(Debug, Default)]
pub struct Chunk {
    pub stage: ChunkStage,
    /// Mesh no longer matches the blocks (own edit or neighbor generation).
    pub mesh_stale: bool,
    /// Vertex buffers no longer match the mesh.
    pub graphics_stale: bool,
    /// Bound lights / shadow maps no longer match the mesh or the
    /// surrounding solid geometry.
    pub lighting_stale: bool,
    /// The relevant-slot aggregation below is out of date.
    pub light_index_stale: bool,
    /// Global shadow slots whose lights can reach this chunk: its own plus
    /// its Moore neighbors', capped at the per-draw limit.
    pub light_indices: Vec<u32>,
}

impl Chunk {
    /// A fresh placeholder with nothing generated.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> Option<&VoxelGrid> {
        match &self.stage {
            ChunkStage::Empty => None,
            ChunkStage::Generated { blocks }
            | ChunkStage::Meshed { blocks, .. }
            | ChunkStage::Uploaded { blocks, .. }
            | ChunkStage::Lit { blocks, .. } => Some(blocks),
        }
    }

    pub fn blocks_mut(&mut self) -> Option<&mut VoxelGrid> {
        match &mut self.stage {
            ChunkStage::Empty => None,
            ChunkStage::Generated { blocks }
            | ChunkStage::Meshed { blocks, .. }
            | ChunkStage::Uploaded { blocks, .. }
            | ChunkStage::Lit { blocks, .. } => Some(blocks),
        }
    }

    pub fn mesh(&self) -> Option<&MeshBuckets> {
        match &self.stage {
            ChunkStage::Empty | ChunkStage::Generated { .. } => None,
            ChunkStage::Meshed { mesh, .. }
            | ChunkStage::Uploaded { mesh, .. }
            | ChunkStage::Lit { mesh, .. } => Some(mesh),
        }
    }

    pub fn graphics(&self) -> Option<&ChunkGraphics> {
        match &self.stage {
            ChunkStage::Uploaded { graphics, .. } | ChunkStage::Lit { graphics, .. } => {
                Some(graphics)
            }
            _ => None,
        }
    }

    pub fn graphics_mut(&mut self) -> Option<&mut ChunkGraphics> {
        match &mut self.stage {
            ChunkStage::Uploaded { graphics, .. } | ChunkStage::Lit { graphics, .. } => {
                Some(graphics)
            }
            _ => None,
        }
    }

    /// Lights currently bound to shadow slots. Empty below the `Lit` stage.
    pub fn lights(&self) -> &[BoundLight] {
        match &self.stage {
            ChunkStage::Lit { lights, .. } => lights,
            _ => &[],
        }
    }

    pub fn lights_mut(&mut self) -> Option<&mut Vec<BoundLight>> {
        match &mut self.stage {
            ChunkStage::Lit { lights, .. } => Some(lights),
            _ => None,
        }
    }

    /// `Empty → Generated`.
    pub fn install_blocks(&mut self, blocks: VoxelGrid) {
        debug_assert!(matches!(self.stage, ChunkStage::Empty), "blocks already generated");
        self.stage = ChunkStage::Generated { blocks };
    }

    /// `Generated → Meshed`, or replaces the mesh in place at any later
    /// stage, keeping graphics and lights for their own rebuild passes.
    pub fn install_mesh(&mut self, mesh: MeshBuckets) {
        self.stage = match mem::take(&mut self.stage) {
            ChunkStage::Generated { blocks } | ChunkStage::Meshed { blocks, .. } => {
                ChunkStage::Meshed { blocks, mesh }
            }
            ChunkStage::Uploaded { blocks, graphics, .. } => ChunkStage::Uploaded {
                blocks,
                mesh,
                graphics,
            },
            ChunkStage::Lit {
                blocks,
                graphics,
                lights,
                ..
            } => ChunkStage::Lit {
                blocks,
                mesh,
                graphics,
                lights,
            },
            ChunkStage::Empty => unreachable!("meshed a chunk with no blocks"),
        };
    }

    /// `Meshed → Uploaded`. Rebuilds at later stages go through
    /// [`Chunk::graphics_mut`] instead so bound lights survive.
    pub fn install_graphics(&mut self, graphics: ChunkGraphics) {
        self.stage = match mem::take(&mut self.stage) {
            ChunkStage::Meshed { blocks, mesh } => ChunkStage::Uploaded {
                blocks,
                mesh,
                graphics,
            },
            other => unreachable!("graphics installed at stage {other:?}"),
        };
    }

    /// `Uploaded → Lit`. Later reconciliations go through
    /// [`Chunk::lights_mut`].
    pub fn install_lights(&mut self, lights: Vec<BoundLight>) {
        self.stage = match mem::take(&mut self.stage) {
            ChunkStage::Uploaded {
                blocks,
                mesh,
                graphics,
            } => ChunkStage::Lit {
                blocks,
                mesh,
                graphics,
                lights,
            },
            other => unreachable!("lights installed at stage {other:?}"),
        };
    }

    /// Tears the chunk down for eviction, returning the GPU buffers to free
    /// and the shadow slots to release.
    pub fn into_resources(self) -> (Option<ChunkGraphics>, Vec<BoundLight>) {
        match self.stage {
            ChunkStage::Empty | ChunkStage::Generated { .. } | ChunkStage::Meshed { .. } => {
                (None, Vec::new())
            }
            ChunkStage::Uploaded { graphics, .. } => (Some(graphics), Vec::new()),
            ChunkStage::Lit {
                graphics, lights, ..
            } => (Some(graphics), lights),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_lighting::ShadowSlot;
    use strata_mesh::{Face, FaceDirection};
    use strata_voxel::BlockId;

    fn meshed_chunk() -> Chunk {
        let mut chunk = Chunk::new();
        chunk.install_blocks(VoxelGrid::new_air());
        chunk.install_mesh(MeshBuckets::default());
        chunk
    }

    #[test]
    fn test_ladder_accessors_track_stage() {
        let mut chunk = Chunk::new();
        assert!(chunk.blocks().is_none());
        assert!(chunk.mesh().is_none());

        chunk.install_blocks(VoxelGrid::new_air());
        assert!(chunk.blocks().is_some());
        assert!(chunk.mesh().is_none());
        assert!(chunk.graphics().is_none());

        chunk.install_mesh(MeshBuckets::default());
        assert!(chunk.mesh().is_some());
        assert!(chunk.graphics().is_none());

        chunk.install_graphics(ChunkGraphics::default());
        assert!(chunk.graphics().is_some());
        assert!(chunk.lights().is_empty());
        assert!(chunk.lights_mut().is_none());

        chunk.install_lights(Vec::new());
        assert!(chunk.lights_mut().is_some());
        assert!(chunk.blocks().is_some(), "lit chunk still exposes blocks");
    }

    #[test]
    fn test_mesh_rebuild_keeps_graphics_and_lights() {
        let mut chunk = meshed_chunk();
        chunk.install_graphics(ChunkGraphics {
            solid: Some(MeshHandle(3)),
            transparent: None,
        });
        let bound = BoundLight {
            slot: ShadowSlot(0),
            face: Face {
                block: BlockId(1),
                direction: FaceDirection::PosY,
                origin: glam::IVec3::ZERO,
            },
        };
        chunk.install_lights(vec![bound]);

        let mut replacement = MeshBuckets::default();
        replacement.solid.push(bound.face);
        chunk.install_mesh(replacement);

        assert_eq!(chunk.mesh().unwrap().solid.len(), 1);
        assert_eq!(chunk.graphics().unwrap().solid, Some(MeshHandle(3)));
        assert_eq!(chunk.lights(), &[bound]);
    }

    #[test]
    fn test_into_resources_surrenders_everything() {
        let mut chunk = meshed_chunk();
        chunk.install_graphics(ChunkGraphics {
            solid: Some(MeshHandle(7)),
            transparent: Some(MeshHandle(8)),
        });
        chunk.install_lights(vec![BoundLight {
            slot: ShadowSlot(2),
            face: Face {
                block: BlockId(1),
                direction: FaceDirection::NegZ,
                origin: glam::IVec3::ZERO,
            },
        }]);

        let (graphics, lights) = chunk.into_resources();
        let graphics = graphics.unwrap();
        assert_eq!(graphics.solid, Some(MeshHandle(7)));
        assert_eq!(graphics.transparent, Some(MeshHandle(8)));
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].slot, ShadowSlot(2));
    }

    #[test]
    fn test_early_stage_eviction_has_no_resources() {
        let (graphics, lights) = Chunk::new().into_resources();
        assert!(graphics.is_none());
        assert!(lights.is_empty());

        let (graphics, lights) = meshed_chunk().into_resources();
        assert!(graphics.is_none());
        assert!(lights.is_empty());
    }
}
