//! The wgpu implementation of the world's GPU seam.
//!
//! [`WgpuBackend`] owns everything frame-related: the surface context,
//! depth buffer, pipelines, shadow atlas, block textures, and the pooled
//! chunk vertex buffers behind mesh handles. The world calls it through
//! the `WorldGpu` trait; create/free counters make resource pairing
//! observable from outside.

use bytemuck::{bytes_of, cast_slice};
use glam::Mat4;
use strata_lighting::{LightGpu, ShadowSlot};
use strata_mesh::FaceVertex;
use strata_world::{DrawItem, FramePlan, MeshHandle, WorldGpu};

use crate::context::{RenderContext, SurfaceError};
use crate::depth::DepthBuffer;
use crate::pipeline::{CameraUniform, ChunkPipelines, DRAW_LIGHTS_STRIDE, DrawLightsGpu};
use crate::pool::VertexBufferPool;
use crate::shadow::ShadowAtlas;
use crate::texture::{BlockTextures, TextureError};

/// Sky clear color (linear space).
const SKY: wgpu::Color = wgpu::Color {
    r: 0.16,
    g: 0.35,
    b: 0.65,
    a: 1.0,
};

/// Cumulative buffer lifecycle counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackendStats {
    /// Mesh buffers handed out by `upload_mesh`.
    pub meshes_created: u32,
    /// Mesh buffers returned through `free_mesh`.
    pub meshes_freed: u32,
}

struct PooledMesh {
    buffer: wgpu::Buffer,
    size_class: usize,
    vertex_count: u32,
}

/// wgpu renderer implementing the world's GPU operations.
pub struct WgpuBackend {
    context: RenderContext,
    depth: DepthBuffer,
    pipelines: ChunkPipelines,
    atlas: ShadowAtlas,
    textures: BlockTextures,

    pool: VertexBufferPool,
    meshes: Vec<Option<PooledMesh>>,
    free_handles: Vec<u32>,
    stats: BackendStats,

    /// CPU copy of each slot's light matrix, for shadow pass rebinds.
    light_matrices: Vec<[f32; 16]>,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    lighting_bind_group: wgpu::BindGroup,
    shadow_matrix_buffer: wgpu::Buffer,
    shadow_matrix_bind_group: wgpu::BindGroup,
    draw_lights_buffer: wgpu::Buffer,
    draw_lights_bind_group: wgpu::BindGroup,
    draw_lights_capacity: u32,
}

impl WgpuBackend {
    /// Builds the full frame stack over an initialized context.
    pub fn new(
        context: RenderContext,
        texture_layers: &[Vec<u8>],
        shadow_slots: u32,
        shadow_resolution: u32,
    ) -> Result<Self, TextureError> {
        let device = &context.device;
        let pipelines = ChunkPipelines::new(device, context.surface_format);
        let depth = DepthBuffer::new(
            device,
            context.surface_config.width,
            context.surface_config.height,
        );
        let atlas = ShadowAtlas::new(device, shadow_slots, shadow_resolution);
        let textures = BlockTextures::new(device, &context.queue, texture_layers)?;

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera-uniform"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera-bind-group"),
            layout: &pipelines.camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("block-texture-bind-group"),
            layout: &pipelines.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&textures.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&textures.sampler),
                },
            ],
        });

        let lighting_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lighting-bind-group"),
            layout: &pipelines.lighting_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: atlas.light_table.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&atlas.array_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
        });

        let shadow_matrix_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shadow-matrix-uniform"),
            size: 64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let shadow_matrix_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow-matrix-bind-group"),
            layout: &pipelines.shadow_matrix_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: shadow_matrix_buffer.as_entire_binding(),
            }],
        });

        let (draw_lights_buffer, draw_lights_bind_group) =
            create_draw_lights_buffer(device, &pipelines, 64);

        Ok(Self {
            context,
            depth,
            pipelines,
            atlas,
            textures,
            pool: VertexBufferPool::new(),
            meshes: Vec::new(),
            free_handles: Vec::new(),
            stats: BackendStats::default(),
            light_matrices: vec![Mat4::IDENTITY.to_cols_array(); shadow_slots as usize],
            camera_buffer,
            camera_bind_group,
            texture_bind_group,
            lighting_bind_group,
            shadow_matrix_buffer,
            shadow_matrix_bind_group,
            draw_lights_buffer,
            draw_lights_bind_group,
            draw_lights_capacity: 64,
        })
    }

    /// Surface resize: reconfigure and match the depth buffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        self.depth.resize(
            &self.context.device,
            self.context.surface_config.width,
            self.context.surface_config.height,
        );
    }

    pub fn stats(&self) -> BackendStats {
        self.stats
    }

    /// Bytes of vertex memory held by live chunk meshes.
    pub fn mesh_bytes_in_use(&self) -> u64 {
        self.pool.bytes_in_use()
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn texture_layer_count(&self) -> u32 {
        self.textures.layer_count()
    }

    fn ensure_draw_lights_capacity(&mut self, needed: u32) {
        if needed <= self.draw_lights_capacity {
            return;
        }
        let capacity = needed.next_power_of_two();
        let (buffer, bind_group) =
            create_draw_lights_buffer(&self.context.device, &self.pipelines, capacity);
        self.draw_lights_buffer = buffer;
        self.draw_lights_bind_group = bind_group;
        self.draw_lights_capacity = capacity;
    }

    /// Issues one bucket's draws; `base` is the entry index of the first
    /// item in the draw-lights buffer.
    fn draw_items(&self, pass: &mut wgpu::RenderPass<'_>, items: &[DrawItem], base: u32) {
        for (i, item) in items.iter().enumerate() {
            let Some(mesh) = self.mesh(item.mesh) else {
                continue;
            };
            let offset = (u64::from(base) + i as u64) * DRAW_LIGHTS_STRIDE;
            pass.set_bind_group(3, &self.draw_lights_bind_group, &[offset as u32]);
            pass.set_vertex_buffer(0, mesh.buffer.slice(..));
            pass.draw(0..mesh.vertex_count, 0..1);
        }
    }

    fn mesh(&self, handle: MeshHandle) -> Option<&PooledMesh> {
        let mesh = self.meshes.get(handle.0 as usize).and_then(Option::as_ref);
        debug_assert!(mesh.is_some(), "draw referenced freed mesh {handle:?}");
        mesh
    }
}

fn create_draw_lights_buffer(
    device: &wgpu::Device,
    pipelines: &ChunkPipelines,
    capacity: u32,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("draw-lights-uniform"),
        size: DRAW_LIGHTS_STRIDE * u64::from(capacity),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("draw-lights-bind-group"),
        layout: &pipelines.draw_lights_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: std::num::NonZeroU64::new(std::mem::size_of::<DrawLightsGpu>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

impl WorldGpu for WgpuBackend {
    fn upload_mesh(&mut self, vertices: &[FaceVertex]) -> MeshHandle {
        let bytes: &[u8] = cast_slice(vertices);
        let (buffer, size_class) = self.pool.acquire(&self.context.device, bytes.len() as u64);
        self.context.queue.write_buffer(&buffer, 0, bytes);

        let mesh = PooledMesh {
            buffer,
            size_class,
            vertex_count: vertices.len() as u32,
        };
        self.stats.meshes_created += 1;

        match self.free_handles.pop() {
            Some(index) => {
                self.meshes[index as usize] = Some(mesh);
                MeshHandle(index)
            }
            None => {
                self.meshes.push(Some(mesh));
                MeshHandle(self.meshes.len() as u32 - 1)
            }
        }
    }

    fn free_mesh(&mut self, handle: MeshHandle) {
        let Some(mesh) = self
            .meshes
            .get_mut(handle.0 as usize)
            .and_then(Option::take)
        else {
            log::warn!("free_mesh on unknown handle {handle:?}");
            return;
        };
        self.pool.release(mesh.buffer, mesh.size_class);
        self.free_handles.push(handle.0);
        self.stats.meshes_freed += 1;
    }

    fn write_light(&mut self, slot: ShadowSlot, light: &LightGpu) {
        self.light_matrices[slot.0 as usize] = light.view_proj;
        self.atlas.write_light(&self.context.queue, slot, light);
    }

    fn render_shadow_map(&mut self, slot: ShadowSlot, casters: &[MeshHandle]) {
        self.context.queue.write_buffer(
            &self.shadow_matrix_buffer,
            0,
            bytes_of(&self.light_matrices[slot.0 as usize]),
        );

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("shadow-encoder"),
                });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow-pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.atlas.layer_view(slot),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&self.pipelines.shadow);
            pass.set_bind_group(0, &self.shadow_matrix_bind_group, &[]);
            for handle in casters {
                if let Some(mesh) = self.mesh(*handle) {
                    pass.set_vertex_buffer(0, mesh.buffer.slice(..));
                    pass.draw(0..mesh.vertex_count, 0..1);
                }
            }
        }
        self.context.queue.submit(std::iter::once(encoder.finish()));
    }

    fn submit_frame(&mut self, view_proj: Mat4, plan: &FramePlan) {
        let item_count = (plan.opaque.len() + plan.translucent.len()) as u32;
        self.ensure_draw_lights_capacity(item_count.max(1));

        let camera = CameraUniform {
            view_proj: view_proj.to_cols_array(),
        };
        self.context
            .queue
            .write_buffer(&self.camera_buffer, 0, bytes_of(&camera));

        for (i, item) in plan.opaque.iter().chain(&plan.translucent).enumerate() {
            self.context.queue.write_buffer(
                &self.draw_lights_buffer,
                i as u64 * DRAW_LIGHTS_STRIDE,
                bytes_of(&DrawLightsGpu::from_item(item)),
            );
        }

        let frame = match self.context.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Timeout) => return,
            Err(error) => {
                log::warn!("Skipping frame: {error}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame-encoder"),
                });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(SKY),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_bind_group(1, &self.texture_bind_group, &[]);
            pass.set_bind_group(2, &self.lighting_bind_group, &[]);

            pass.set_pipeline(&self.pipelines.opaque);
            self.draw_items(&mut pass, &plan.opaque, 0);

            // Pre-sorted back to front; depth writes are off.
            pass.set_pipeline(&self.pipelines.translucent);
            self.draw_items(&mut pass, &plan.translucent, plan.opaque.len() as u32);

            pass.set_pipeline(&self.pipelines.highlight);
            for handle in &plan.highlights {
                if let Some(mesh) = self.mesh(*handle) {
                    pass.set_vertex_buffer(0, mesh.buffer.slice(..));
                    pass.draw(0..mesh.vertex_count, 0..1);
                }
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}
