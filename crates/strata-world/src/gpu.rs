//! The seam between the chunk store and the GPU backend.
//!
//! The world never touches a graphics API directly: it asks a [`WorldGpu`]
//! implementation to upload and free vertex buffers, fill shadow slots, and
//! submit one frame's draw list. Resource pairing is the world's job —
//! every handle it receives from `upload_mesh` is returned through exactly
//! one `free_mesh`, on rebuild or on eviction. Tests drive the world
//! against a counting fake of this trait; `strata-render` provides the
//! wgpu implementation.

use glam::Mat4;
use strata_lighting::{LightGpu, ShadowSlot};
use strata_mesh::FaceVertex;

/// Maximum shadow slots one draw call may reference. Matches the fixed
/// uniform array length in the chunk shader.
pub const MAX_LIGHTS_PER_DRAW: usize = 8;

/// Opaque index of one uploaded vertex buffer in the backend's pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// One chunk draw: a vertex buffer plus the shadow slots whose lights can
/// reach it.
#[derive(Clone, Debug)]
pub struct DrawItem {
    pub mesh: MeshHandle,
    pub light_slots: Vec<u32>,
}

/// Everything the backend needs to draw one frame, in pass order:
/// opaque, then translucent back-to-front with depth writes off, then
/// highlights.
#[derive(Clone, Debug, Default)]
pub struct FramePlan {
    pub opaque: Vec<DrawItem>,
    /// Already sorted back-to-front by chunk center.
    pub translucent: Vec<DrawItem>,
    pub highlights: Vec<MeshHandle>,
}

/// GPU operations the world needs, in the order it performs them: buffer
/// lifecycle during scheduling, shadow work when lighting rebuilds, frame
/// submission at render time.
pub trait WorldGpu {
    /// Creates a vertex buffer from a synthesized triangle list.
    fn upload_mesh(&mut self, vertices: &[FaceVertex]) -> MeshHandle;

    /// Destroys a buffer previously returned by `upload_mesh`.
    fn free_mesh(&mut self, mesh: MeshHandle);

    /// Writes one light's record (projection, position, color) into the
    /// global light table at `slot`.
    fn write_light(&mut self, slot: ShadowSlot, light: &LightGpu);

    /// Renders a depth-only pass of `casters` into `slot`'s shadow map
    /// layer, using the projection most recently written to that slot.
    fn render_shadow_map(&mut self, slot: ShadowSlot, casters: &[MeshHandle]);

    /// Draws one frame.
    fn submit_frame(&mut self, view_proj: Mat4, plan: &FramePlan);
}
