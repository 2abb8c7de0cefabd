//! Shadow atlas: one depth layer and one light record per shadow slot.
//!
//! The atlas is a `Depth32Float` texture array sized to the slot pool. Each
//! slot owns a layer (rendered into through a per-layer view) and a 96-byte
//! record in the light table storage buffer; the chunk shader indexes both
//! by slot. Depth comparisons are reverse-Z like the main pass.

use bytemuck::bytes_of;
use strata_lighting::{LightGpu, ShadowSlot};

/// Byte stride of one light record in the table.
const LIGHT_STRIDE: u64 = std::mem::size_of::<LightGpu>() as u64;

static_assertions::const_assert_eq!(std::mem::size_of::<LightGpu>(), 96);

/// GPU resources backing the shadow slot pool.
pub struct ShadowAtlas {
    pub texture: wgpu::Texture,
    /// Full-array view for sampling in the chunk shader.
    pub array_view: wgpu::TextureView,
    /// One render-target view per slot layer.
    layer_views: Vec<wgpu::TextureView>,
    /// Comparison sampler for hardware PCF.
    pub sampler: wgpu::Sampler,
    /// `LightGpu` record per slot, indexed by slot in the chunk shader.
    pub light_table: wgpu::Buffer,
    slot_count: u32,
}

impl ShadowAtlas {
    pub fn new(device: &wgpu::Device, slot_count: u32, resolution: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow-atlas"),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: slot_count,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("shadow-atlas-array-view"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        let layer_views = (0..slot_count)
            .map(|i| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&format!("shadow-slot-{i}")),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: i,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        // Reverse-Z: a fragment is lit when its light-space depth is at
        // least the stored occluder depth.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow-comparison-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::GreaterEqual),
            ..Default::default()
        });

        let light_table = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("light-table"),
            size: LIGHT_STRIDE * u64::from(slot_count.max(1)),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            texture,
            array_view,
            layer_views,
            sampler,
            light_table,
            slot_count,
        }
    }

    /// Render-target view of one slot's depth layer.
    pub fn layer_view(&self, slot: ShadowSlot) -> &wgpu::TextureView {
        &self.layer_views[slot.0 as usize]
    }

    /// Overwrite one slot's record in the light table.
    pub fn write_light(&self, queue: &wgpu::Queue, slot: ShadowSlot, light: &LightGpu) {
        queue.write_buffer(
            &self.light_table,
            LIGHT_STRIDE * u64::from(slot.0),
            bytes_of(light),
        );
    }

    pub fn slot_count(&self) -> u32 {
        self.slot_count
    }
}
