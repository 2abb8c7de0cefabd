//! wgpu rendering backend.
//!
//! Owns the surface, the reverse-Z depth buffer, the chunk pipelines, the
//! shadow atlas, and the pooled chunk vertex buffers. [`WgpuBackend`] is
//! the crate's face toward the world: it implements the world's GPU trait
//! so chunk streaming never touches wgpu types directly.
//!
//! GPU tests in this crate return early when no adapter is available, so
//! they pass on headless CI.

pub mod backend;
pub mod context;
pub mod depth;
pub mod pipeline;
pub mod pool;
pub mod shadow;
pub mod texture;

pub use backend::{BackendStats, WgpuBackend};
pub use context::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use depth::DepthBuffer;
pub use pipeline::ChunkPipelines;
pub use pool::VertexBufferPool;
pub use shadow::ShadowAtlas;
pub use texture::{
    BlockTextures, TEXTURE_SIZE, TextureError, bordered_layer, flat_layer, speckled_layer,
};

/// Headless device for GPU tests; `None` when no adapter exists.
#[cfg(test)]
pub(crate) fn test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .ok()?;
        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .ok()
    })
}
