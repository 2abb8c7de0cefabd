//! Render pipelines and their WGSL shaders.
//!
//! Four pipelines share the chunk vertex layout: opaque chunk geometry,
//! a translucent variant with alpha blending and depth writes disabled,
//! a depth-only shadow pass, and the picked-face highlight. All depth
//! state is reverse-Z, taken from [`DepthBuffer`]'s constants.
//!
//! Per-draw light lists ride in a dynamic-offset uniform: one
//! [`DrawLightsGpu`] entry per draw item, packed into a single buffer the
//! backend rewrites each frame.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use strata_mesh::FACE_VERTEX_LAYOUT;
use strata_world::{DrawItem, MAX_LIGHTS_PER_DRAW};

use crate::depth::DepthBuffer;

/// Camera uniform: one view-projection matrix. 64 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [f32; 16],
}

static_assertions::assert_eq_size!(CameraUniform, [u8; 64]);

/// One draw's shadow slot list, padded for uniform address space rules.
/// 48 bytes of payload; entries are placed at 256-byte dynamic offsets.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct DrawLightsGpu {
    pub count: u32,
    _pad: [u32; 3],
    /// Slot indices, vec4-packed: two vec4<u32> hold the 8-slot cap.
    pub slots: [[u32; 4]; 2],
}

static_assertions::assert_eq_size!(DrawLightsGpu, [u8; 48]);
static_assertions::const_assert_eq!(MAX_LIGHTS_PER_DRAW, 8);

/// Dynamic-offset stride between entries; the WebGPU default minimum
/// uniform offset alignment.
pub const DRAW_LIGHTS_STRIDE: u64 = 256;

impl DrawLightsGpu {
    pub fn from_item(item: &DrawItem) -> Self {
        let mut entry = Self::default();
        for (i, slot) in item.light_slots.iter().take(MAX_LIGHTS_PER_DRAW).enumerate() {
            entry.slots[i / 4][i % 4] = *slot;
        }
        entry.count = item.light_slots.len().min(MAX_LIGHTS_PER_DRAW) as u32;
        entry
    }
}

/// WGSL for the opaque and translucent chunk pipelines.
///
/// Shading is diffuse-only: a flat ambient floor plus N·L from each light
/// slot named by the draw's light list, shadowed by a comparison sample
/// against the slot's atlas layer.
pub const CHUNK_SHADER_SOURCE: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
};

struct Light {
    view_proj: mat4x4<f32>,
    position_range: vec4<f32>,
    color_intensity: vec4<f32>,
};

struct DrawLights {
    count: u32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
    slots: array<vec4<u32>, 2>,
};

@group(0) @binding(0) var<uniform> camera: Camera;

@group(1) @binding(0) var block_textures: texture_2d_array<f32>;
@group(1) @binding(1) var block_sampler: sampler;

@group(2) @binding(0) var<storage, read> lights: array<Light>;
@group(2) @binding(1) var shadow_atlas: texture_depth_2d_array;
@group(2) @binding(2) var shadow_sampler: sampler_comparison;

@group(3) @binding(0) var<uniform> draw_lights: DrawLights;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) layer: u32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) @interpolate(flat) layer: u32,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.view_proj * vec4<f32>(in.position, 1.0);
    out.world_position = in.position;
    out.normal = in.normal;
    out.uv = in.uv;
    out.layer = in.layer;
    return out;
}

fn slot_at(i: u32) -> u32 {
    return draw_lights.slots[i / 4u][i % 4u];
}

fn shadow_factor(light: Light, slot: u32, world_pos: vec3<f32>) -> f32 {
    let light_pos = light.view_proj * vec4<f32>(world_pos, 1.0);
    if light_pos.w <= 0.0 {
        return 0.0;
    }
    let ndc = light_pos.xyz / light_pos.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5);
    if uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 {
        return 0.0;
    }
    return textureSampleCompareLevel(shadow_atlas, shadow_sampler, uv, i32(slot), ndc.z);
}

fn attenuation(dist: f32, range: f32) -> f32 {
    if dist >= range {
        return 0.0;
    }
    let ratio = dist / range;
    let window = max(1.0 - ratio * ratio, 0.0);
    return window * window / (dist * dist + 1.0);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(block_textures, block_sampler, in.uv, i32(in.layer));
    let normal = normalize(in.normal);

    var color = albedo.rgb * 0.18;
    for (var i = 0u; i < draw_lights.count; i++) {
        let slot = slot_at(i);
        let light = lights[slot];
        let to_light = light.position_range.xyz - in.world_position;
        let dist = length(to_light);
        let n_dot_l = max(dot(normal, to_light / max(dist, 0.0001)), 0.0);
        if n_dot_l <= 0.0 {
            continue;
        }
        let shadow = shadow_factor(light, slot, in.world_position);
        let atten = attenuation(dist, light.position_range.w);
        color += albedo.rgb * light.color_intensity.xyz
               * light.color_intensity.w * n_dot_l * atten * shadow;
    }

    return vec4<f32>(color, albedo.a);
}
"#;

/// WGSL for the depth-only shadow pass. The bound matrix is the slot's
/// light-space view-projection.
pub const SHADOW_SHADER_SOURCE: &str = r#"
struct LightMatrix {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> light: LightMatrix;

@vertex
fn vs_shadow(@location(0) position: vec3<f32>,
             @location(1) normal: vec3<f32>,
             @location(2) uv: vec2<f32>,
             @location(3) layer: u32) -> @builtin(position) vec4<f32> {
    return light.view_proj * vec4<f32>(position, 1.0);
}
"#;

/// WGSL for the picked-face highlight: the face mesh pushed slightly off
/// its block along the normal, drawn translucent white.
pub const HIGHLIGHT_SHADER_SOURCE: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> camera: Camera;

@vertex
fn vs_main(@location(0) position: vec3<f32>,
           @location(1) normal: vec3<f32>,
           @location(2) uv: vec2<f32>,
           @location(3) layer: u32) -> @builtin(position) vec4<f32> {
    let offset = position + normal * 0.01;
    return camera.view_proj * vec4<f32>(offset, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, 0.35);
}
"#;

/// The four pipelines plus the bind group layouts the backend builds
/// groups from.
pub struct ChunkPipelines {
    pub opaque: wgpu::RenderPipeline,
    pub translucent: wgpu::RenderPipeline,
    pub highlight: wgpu::RenderPipeline,
    pub shadow: wgpu::RenderPipeline,
    pub camera_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pub lighting_layout: wgpu::BindGroupLayout,
    pub draw_lights_layout: wgpu::BindGroupLayout,
    pub shadow_matrix_layout: wgpu::BindGroupLayout,
}

impl ChunkPipelines {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(64),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("block-texture-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let lighting_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lighting-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(96),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let draw_lights_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("draw-lights-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(48),
                    },
                    count: None,
                }],
            });

        let shadow_matrix_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("shadow-matrix-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(64),
                    },
                    count: None,
                }],
            });

        let chunk_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("chunk-pipeline-layout"),
            bind_group_layouts: &[
                &camera_layout,
                &texture_layout,
                &lighting_layout,
                &draw_lights_layout,
            ],
            immediate_size: 0,
        });

        let chunk_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("chunk-shader"),
            source: wgpu::ShaderSource::Wgsl(CHUNK_SHADER_SOURCE.into()),
        });

        let opaque = build_chunk_pipeline(
            device,
            "opaque-pipeline",
            &chunk_layout,
            &chunk_shader,
            surface_format,
            None,
            true,
            Some(wgpu::Face::Back),
        );

        let translucent = build_chunk_pipeline(
            device,
            "translucent-pipeline",
            &chunk_layout,
            &chunk_shader,
            surface_format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
            None,
        );

        let highlight_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("highlight-pipeline-layout"),
            bind_group_layouts: &[&camera_layout],
            immediate_size: 0,
        });

        let highlight_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("highlight-shader"),
            source: wgpu::ShaderSource::Wgsl(HIGHLIGHT_SHADER_SOURCE.into()),
        });

        let highlight = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("highlight-pipeline"),
            layout: Some(&highlight_layout),
            vertex: wgpu::VertexState {
                module: &highlight_shader,
                entry_point: Some("vs_main"),
                buffers: &[FACE_VERTEX_LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: false,
                depth_compare: DepthBuffer::COMPARE_FUNCTION,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &highlight_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let shadow_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow-pipeline-layout"),
            bind_group_layouts: &[&shadow_matrix_layout],
            immediate_size: 0,
        });

        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow-shader"),
            source: wgpu::ShaderSource::Wgsl(SHADOW_SHADER_SOURCE.into()),
        });

        let shadow = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow-depth-pipeline"),
            layout: Some(&shadow_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_shadow"),
                buffers: &[FACE_VERTEX_LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                // Front-face culling reduces acne on solid geometry.
                cull_mode: Some(wgpu::Face::Front),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: DepthBuffer::COMPARE_FUNCTION,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 1.75,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: None,
            multiview_mask: None,
            cache: None,
        });

        Self {
            opaque,
            translucent,
            highlight,
            shadow,
            camera_layout,
            texture_layout,
            lighting_layout,
            draw_lights_layout,
            shadow_matrix_layout,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_chunk_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
    cull_mode: Option<wgpu::Face>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[FACE_VERTEX_LAYOUT],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: DepthBuffer::COMPARE_FUNCTION,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_device_queue;
    use strata_world::MeshHandle;

    #[test]
    fn test_draw_lights_packing() {
        let item = DrawItem {
            mesh: MeshHandle(0),
            light_slots: vec![3, 1, 4, 1, 5],
        };
        let entry = DrawLightsGpu::from_item(&item);
        assert_eq!(entry.count, 5);
        assert_eq!(entry.slots[0], [3, 1, 4, 1]);
        assert_eq!(entry.slots[1], [5, 0, 0, 0]);
    }

    #[test]
    fn test_draw_lights_respects_per_draw_cap() {
        let item = DrawItem {
            mesh: MeshHandle(0),
            light_slots: (0..20).collect(),
        };
        let entry = DrawLightsGpu::from_item(&item);
        assert_eq!(entry.count, MAX_LIGHTS_PER_DRAW as u32);
        assert_eq!(entry.slots[1], [4, 5, 6, 7]);
    }

    #[test]
    fn test_pipelines_build_against_surface_format() {
        let Some((device, _queue)) = test_device_queue() else {
            return;
        };
        let pipelines = ChunkPipelines::new(&device, wgpu::TextureFormat::Bgra8UnormSrgb);
        let _ = &pipelines.opaque;
        let _ = &pipelines.translucent;
        let _ = &pipelines.highlight;
        let _ = &pipelines.shadow;
    }
}
