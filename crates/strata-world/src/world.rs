//! The streaming voxel world: public surface and the per-frame scheduler.
//!
//! [`World::update`] does a bounded amount of work and returns: recenter
//! the streaming shell if the viewpoint crossed a chunk boundary, then
//! advance chunk pipeline stages round-robin until the stage budget is
//! spent. Every stage advance is charged one unit, so a long streaming
//! operation is sliced across many frames instead of stalling one.
//!
//! Staleness flows strictly downstream: generation marks face neighbors'
//! meshes, mesh rebuilds mark own graphics and the Moore neighborhood's
//! lighting, slot changes mark light-index aggregations. Nothing retries;
//! a stale flag simply gets the stage revisited on a later pass.

use glam::{IVec3, Mat4, Vec3};
use strata_lighting::{LightGpu, ShadowSlotPool, reconcile_slots};
use strata_mesh::{build_mesh, synthesize_vertices};
use strata_terrain::TerrainGenerator;
use strata_voxel::{BlockId, BlockRegistry, CHUNK_EDGE, ChunkCoord, split_world};

use crate::chunk::{Chunk, ChunkGraphics, ChunkStage};
use crate::gpu::{DrawItem, FramePlan, MAX_LIGHTS_PER_DRAW, MeshHandle, WorldGpu};
use crate::highlight::{HighlightStore, highlight_face};
use crate::raycast::{BlockView, RayHit};
use crate::store::ChunkStore;
use crate::stream::{StreamConfig, load_set};

/// World tuning knobs.
#[derive(Clone, Copy, Debug)]
pub struct WorldConfig {
    pub stream: StreamConfig,
    /// Stage advances allowed per `update` call.
    pub stage_budget: u32,
    /// Capacity of the shadow slot pool.
    pub shadow_slots: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            stage_budget: 1,
            shadow_slots: 64,
        }
    }
}

/// Counters for one `update` pass, for the debug HUD / log line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    pub loaded: u32,
    pub evicted: u32,
    pub generated: u32,
    pub meshed: u32,
    pub uploaded: u32,
    pub lit: u32,
    pub light_indexed: u32,
    pub slots_in_use: u32,
}

impl UpdateStats {
    /// `true` if the pass advanced no stage: the world is at a fixed point
    /// for the current viewpoint and edits.
    pub fn is_idle(&self) -> bool {
        self.loaded == 0
            && self.evicted == 0
            && self.generated == 0
            && self.meshed == 0
            && self.uploaded == 0
            && self.lit == 0
            && self.light_indexed == 0
    }
}

/// The pipeline stage a scheduler visit decided to advance.
enum StageAction {
    Generate,
    Mesh,
    Graphics,
    Lighting,
    LightIndex,
}

/// Owns everything: the chunk arena, the terrain generator, the shadow
/// slot pool, the highlight meshes, and the GPU backend.
pub struct World<G: WorldGpu> {
    registry: BlockRegistry,
    generator: TerrainGenerator,
    config: WorldConfig,
    store: ChunkStore,
    highlights: HighlightStore,
    slots: ShadowSlotPool,
    gpu: G,
    /// Chunk the viewpoint was in at the last recenter.
    center: Option<ChunkCoord>,
    /// Roster position where the next scheduler pass resumes.
    cursor: usize,
    stats: UpdateStats,
}

impl<G: WorldGpu> World<G> {
    pub fn new(
        registry: BlockRegistry,
        generator: TerrainGenerator,
        config: WorldConfig,
        gpu: G,
    ) -> Self {
        Self {
            registry,
            generator,
            slots: ShadowSlotPool::new(config.shadow_slots),
            config,
            store: ChunkStore::new(),
            highlights: HighlightStore::new(),
            gpu,
            center: None,
            cursor: 0,
            stats: UpdateStats::default(),
        }
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// Counters from the most recent `update`.
    pub fn stats(&self) -> &UpdateStats {
        &self.stats
    }

    pub fn loaded_chunks(&self) -> usize {
        self.store.len()
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    /// One scheduling pass. Call once per frame; never blocks.
    pub fn update(&mut self, viewpoint: Vec3) {
        self.stats = UpdateStats::default();

        let center = ChunkCoord::containing(viewpoint);
        if self.center != Some(center) {
            self.center = Some(center);
            self.recenter(center);
        }

        self.run_scheduler();
        self.stats.slots_in_use = self.slots.in_use() as u32;
    }

    /// Evicts chunks beyond the outer radius and inserts placeholders for
    /// the new load set, nearest first.
    fn recenter(&mut self, center: ChunkCoord) {
        let evicted: Vec<ChunkCoord> = self
            .store
            .iter()
            .map(|(coord, _)| *coord)
            .filter(|coord| self.config.stream.should_evict(center, *coord))
            .collect();

        for coord in evicted {
            if let Some(chunk) = self.store.remove(coord) {
                self.release_chunk(chunk);
                self.stats.evicted += 1;
            }
            // Survivors referenced the evicted chunk's geometry in their
            // shadow passes and slot lists. Their meshes are untouched:
            // mesh staleness propagates from generation, not eviction.
            for neighbor in coord.moore_neighbors() {
                if let Some(chunk) = self.store.get_mut(neighbor) {
                    chunk.lighting_stale = true;
                    chunk.light_index_stale = true;
                }
            }
        }

        for coord in load_set(center, &self.config.stream) {
            if self.store.insert_placeholder(coord) {
                self.stats.loaded += 1;
            }
        }
        self.cursor = 0;

        tracing::debug!(
            center = ?center,
            loaded = self.stats.loaded,
            evicted = self.stats.evicted,
            resident = self.store.len(),
            "recentered streaming shell"
        );
    }

    /// Round-robin over the roster, charging one unit per stage advanced,
    /// resuming where the previous pass stopped.
    fn run_scheduler(&mut self) {
        let total = self.store.len();
        if total == 0 {
            return;
        }
        let budget = self.config.stage_budget.max(1);
        if self.cursor >= total {
            self.cursor = 0;
        }

        let mut cost = 0;
        let mut visited = 0;
        while visited < total && cost < budget {
            let coord = self.store.roster()[self.cursor];
            self.cursor = (self.cursor + 1) % total;
            visited += 1;
            cost += self.service(coord);
        }
    }

    /// Advances at most one pipeline stage of one chunk. Returns the cost
    /// charged (0 when the chunk is settled or its mesh gate is closed).
    fn service(&mut self, coord: ChunkCoord) -> u32 {
        let Some(chunk) = self.store.get(coord) else {
            return 0;
        };
        let action = if chunk.blocks().is_none() {
            StageAction::Generate
        } else if chunk.mesh().is_none() || chunk.mesh_stale {
            StageAction::Mesh
        } else if chunk.graphics().is_none() || chunk.graphics_stale {
            StageAction::Graphics
        } else if !matches!(chunk.stage, ChunkStage::Lit { .. }) || chunk.lighting_stale {
            StageAction::Lighting
        } else if chunk.light_index_stale {
            StageAction::LightIndex
        } else {
            return 0;
        };

        match action {
            StageAction::Generate => self.service_generate(coord),
            StageAction::Mesh => self.service_mesh(coord),
            StageAction::Graphics => self.service_graphics(coord),
            StageAction::Lighting => self.service_lighting(coord),
            StageAction::LightIndex => self.service_light_index(coord),
        }
    }

    fn service_generate(&mut self, coord: ChunkCoord) -> u32 {
        let blocks = self.generator.generate(coord);
        self.store
            .get_mut(coord)
            .expect("serviced chunk is loaded")
            .install_blocks(blocks);

        // Neighbor meshes culled faces against this chunk's space while it
        // was absent; their exposed-face sets may have changed.
        for neighbor in coord.face_neighbors() {
            if let Some(chunk) = self.store.get_mut(neighbor) {
                chunk.mesh_stale = true;
            }
        }
        self.stats.generated += 1;
        1
    }

    fn service_mesh(&mut self, coord: ChunkCoord) -> u32 {
        // Meshing ahead of a required neighbor's generation would bake in a
        // seam; skip this pass and retry once the neighbor has blocks.
        if !self.store.face_neighbors_generated(coord) {
            return 0;
        }

        let buckets = {
            let chunk = self.store.get(coord).expect("serviced chunk is loaded");
            let own = chunk.blocks().expect("mesh stage follows generation");
            let neighbors = self.store.neighbor_grids(coord);
            build_mesh(coord.world_origin(), &self.registry, own, &neighbors)
        };

        let chunk = self.store.get_mut(coord).expect("serviced chunk is loaded");
        chunk.install_mesh(buckets);
        chunk.mesh_stale = false;
        chunk.graphics_stale = true;
        chunk.lighting_stale = true;

        // Shadow casters in the whole Moore neighborhood see this chunk's
        // solid geometry.
        for neighbor in coord.moore_neighbors() {
            if let Some(chunk) = self.store.get_mut(neighbor) {
                chunk.lighting_stale = true;
            }
        }
        self.stats.meshed += 1;
        1
    }

    fn service_graphics(&mut self, coord: ChunkCoord) -> u32 {
        let (solid, transparent) = {
            let mesh = self
                .store
                .get(coord)
                .and_then(Chunk::mesh)
                .expect("graphics stage follows meshing");
            (
                synthesize_vertices(&mesh.solid, &self.registry),
                synthesize_vertices(&mesh.transparent, &self.registry),
            )
        };

        // Old buffers go back to the pool before their replacements exist.
        let chunk = self.store.get_mut(coord).expect("serviced chunk is loaded");
        let mut stale_handles: Vec<MeshHandle> = Vec::new();
        if let Some(graphics) = chunk.graphics_mut() {
            stale_handles.extend(graphics.solid.take());
            stale_handles.extend(graphics.transparent.take());
        }
        for handle in stale_handles {
            self.gpu.free_mesh(handle);
        }

        let graphics = ChunkGraphics {
            solid: (!solid.is_empty()).then(|| self.gpu.upload_mesh(&solid)),
            transparent: (!transparent.is_empty()).then(|| self.gpu.upload_mesh(&transparent)),
        };
        let chunk = self.store.get_mut(coord).expect("serviced chunk is loaded");
        match chunk.graphics_mut() {
            Some(slot) => *slot = graphics,
            None => chunk.install_graphics(graphics),
        }
        chunk.graphics_stale = false;
        self.stats.uploaded += 1;
        1
    }

    fn service_lighting(&mut self, coord: ChunkCoord) -> u32 {
        let faces = self
            .store
            .get(coord)
            .and_then(Chunk::mesh)
            .expect("lighting stage follows meshing")
            .light_faces
            .clone();

        let chunk = self.store.get_mut(coord).expect("serviced chunk is loaded");
        let changed = match chunk.lights_mut() {
            Some(held) => reconcile_slots(&mut self.slots, held, &faces),
            None => {
                let mut held = Vec::new();
                let changed = reconcile_slots(&mut self.slots, &mut held, &faces);
                chunk.install_lights(held);
                changed
            }
        };
        chunk.lighting_stale = false;

        // Re-render every held light's shadow map against the current
        // neighborhood geometry, whatever changed.
        let bound = self.store.get(coord).expect("just serviced").lights().to_vec();
        if !bound.is_empty() {
            let casters = self.shadow_casters(coord);
            for light in &bound {
                self.gpu.write_light(light.slot, &LightGpu::from_face(&light.face));
                self.gpu.render_shadow_map(light.slot, &casters);
            }
        }

        if changed {
            // Shaders consult per-chunk slot lists; identity changed.
            if let Some(chunk) = self.store.get_mut(coord) {
                chunk.light_index_stale = true;
            }
            for neighbor in coord.moore_neighbors() {
                if let Some(chunk) = self.store.get_mut(neighbor) {
                    chunk.light_index_stale = true;
                }
            }
        }
        self.stats.lit += 1;
        1
    }

    fn service_light_index(&mut self, coord: ChunkCoord) -> u32 {
        // Own slots first: under the per-draw cap, a chunk's own lights
        // win over neighbors'.
        let mut slots: Vec<u32> = Vec::new();
        if let Some(chunk) = self.store.get(coord) {
            slots.extend(chunk.lights().iter().map(|light| light.slot.0));
        }
        for neighbor in coord.moore_neighbors() {
            if let Some(chunk) = self.store.get(neighbor) {
                slots.extend(chunk.lights().iter().map(|light| light.slot.0));
            }
        }
        slots.truncate(MAX_LIGHTS_PER_DRAW);

        let chunk = self.store.get_mut(coord).expect("serviced chunk is loaded");
        chunk.light_indices = slots;
        chunk.light_index_stale = false;
        self.stats.light_indexed += 1;
        1
    }

    /// Solid-geometry buffers a shadow pass at `coord` renders: the chunk's
    /// own plus its face-adjacent neighbors'.
    fn shadow_casters(&self, coord: ChunkCoord) -> Vec<MeshHandle> {
        let mut casters = Vec::new();
        let mut push = |coord: ChunkCoord| {
            if let Some(handle) = self
                .store
                .get(coord)
                .and_then(Chunk::graphics)
                .and_then(|graphics| graphics.solid)
            {
                casters.push(handle);
            }
        };
        push(coord);
        for neighbor in coord.face_neighbors() {
            push(neighbor);
        }
        casters
    }

    /// Returns every borrowed resource of an evicted chunk to its pool.
    fn release_chunk(&mut self, chunk: Chunk) {
        let (graphics, lights) = chunk.into_resources();
        if let Some(graphics) = graphics {
            if let Some(handle) = graphics.solid {
                self.gpu.free_mesh(handle);
            }
            if let Some(handle) = graphics.transparent {
                self.gpu.free_mesh(handle);
            }
        }
        for light in lights {
            self.slots.release(light.slot);
        }
    }

    // -----------------------------------------------------------------------
    // Queries and edits
    // -----------------------------------------------------------------------

    /// Block at a world coordinate, or `None` for unloaded space.
    pub fn block_at(&self, world: IVec3) -> Option<BlockId> {
        self.store.block_at(world)
    }

    /// Writes one voxel. Returns `false` when the owning chunk has no
    /// generated blocks yet; the caller decides whether that matters.
    ///
    /// The write is visible to `block_at` immediately; the mesh catches up
    /// through the staleness flags on later updates.
    pub fn set_block(&mut self, world: IVec3, id: BlockId) -> bool {
        let (coord, (x, y, z)) = split_world(world);
        let Some(chunk) = self.store.get_mut(coord) else {
            return false;
        };
        let Some(blocks) = chunk.blocks_mut() else {
            return false;
        };
        blocks.set(x, y, z, id);
        chunk.mesh_stale = true;

        // Edits on a boundary face change the neighbor's culling too.
        let edge = CHUNK_EDGE - 1;
        let mut neighbors: Vec<ChunkCoord> = Vec::new();
        if x == 0 {
            neighbors.push(coord.offset(-1, 0, 0));
        }
        if x == edge {
            neighbors.push(coord.offset(1, 0, 0));
        }
        if y == 0 {
            neighbors.push(coord.offset(0, -1, 0));
        }
        if y == edge {
            neighbors.push(coord.offset(0, 1, 0));
        }
        if z == 0 {
            neighbors.push(coord.offset(0, 0, -1));
        }
        if z == edge {
            neighbors.push(coord.offset(0, 0, 1));
        }
        for neighbor in neighbors {
            if let Some(chunk) = self.store.get_mut(neighbor) {
                chunk.mesh_stale = true;
            }
        }
        true
    }

    /// Picks the first pointable block along a ray. Read-only.
    pub fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        crate::raycast::cast_ray(self, origin, direction, max_distance)
    }

    /// Creates or replaces the outline mesh for one UI actor.
    pub fn add_highlight(&mut self, key: &str, hit: &RayHit) {
        let vertices = synthesize_vertices(&[highlight_face(hit)], &self.registry);
        let handle = self.gpu.upload_mesh(&vertices);
        if let Some(displaced) = self.highlights.insert(key, handle) {
            self.gpu.free_mesh(displaced);
        }
    }

    pub fn remove_highlight(&mut self, key: &str) {
        if let Some(handle) = self.highlights.remove(key) {
            self.gpu.free_mesh(handle);
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Builds the frame plan — opaque, then translucent back-to-front, then
    /// highlights — and hands it to the backend.
    pub fn render(&mut self, view_proj: Mat4) {
        let mut plan = FramePlan::default();
        let mut translucent: Vec<(f32, DrawItem)> = Vec::new();

        for (coord, chunk) in self.store.iter() {
            let Some(graphics) = chunk.graphics() else {
                continue;
            };
            if let Some(mesh) = graphics.solid {
                plan.opaque.push(DrawItem {
                    mesh,
                    light_slots: chunk.light_indices.clone(),
                });
            }
            if let Some(mesh) = graphics.transparent {
                let center =
                    coord.world_origin().as_vec3() + Vec3::splat(CHUNK_EDGE as f32 * 0.5);
                let depth = (view_proj * center.extend(1.0)).w;
                translucent.push((
                    depth,
                    DrawItem {
                        mesh,
                        light_slots: chunk.light_indices.clone(),
                    },
                ));
            }
        }

        translucent.sort_by(|a, b| b.0.total_cmp(&a.0));
        plan.translucent = translucent.into_iter().map(|(_, item)| item).collect();
        plan.highlights = self.highlights.handles().collect();

        self.gpu.submit_frame(view_proj, &plan);
    }
}

impl<G: WorldGpu> BlockView for World<G> {
    fn block_at(&self, world: IVec3) -> Option<BlockId> {
        self.store.block_at(world)
    }

    fn is_pointable(&self, id: BlockId) -> bool {
        self.registry.is_pointable(id)
    }
}
