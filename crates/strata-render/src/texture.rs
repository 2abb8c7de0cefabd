//! Procedurally generated block texture array.
//!
//! The demo ships no asset files: every block face texture is a 16x16 RGBA
//! layer painted at startup and uploaded into one 2D texture array. Block
//! definitions reference layers by index, which flows through the mesher
//! into the per-vertex `layer` attribute.

/// Edge length of every layer, in texels.
pub const TEXTURE_SIZE: u32 = 16;
const LAYER_BYTES: usize = (TEXTURE_SIZE * TEXTURE_SIZE * 4) as usize;

/// Errors raised while building the texture array.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// Layer pixel data has the wrong length for a 16x16 RGBA texture.
    #[error("layer {layer} has {actual} bytes, expected {expected}")]
    LayerSizeMismatch {
        layer: usize,
        actual: usize,
        expected: usize,
    },

    /// An array texture needs at least one layer.
    #[error("texture array needs at least one layer")]
    NoLayers,
}

/// The block texture array with its view and nearest-neighbor sampler.
pub struct BlockTextures {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    layer_count: u32,
}

impl BlockTextures {
    /// Upload `layers` (16x16 RGBA each) into a fresh 2D texture array.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layers: &[Vec<u8>],
    ) -> Result<Self, TextureError> {
        if layers.is_empty() {
            return Err(TextureError::NoLayers);
        }
        for (i, layer) in layers.iter().enumerate() {
            if layer.len() != LAYER_BYTES {
                return Err(TextureError::LayerSizeMismatch {
                    layer: i,
                    actual: layer.len(),
                    expected: LAYER_BYTES,
                });
            }
        }

        let layer_count = layers.len() as u32;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("block-texture-array"),
            size: wgpu::Extent3d {
                width: TEXTURE_SIZE,
                height: TEXTURE_SIZE,
                depth_or_array_layers: layer_count,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (i, layer) in layers.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: i as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                layer,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(TEXTURE_SIZE * 4),
                    rows_per_image: Some(TEXTURE_SIZE),
                },
                wgpu::Extent3d {
                    width: TEXTURE_SIZE,
                    height: TEXTURE_SIZE,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("block-texture-array-view"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        // Nearest filtering keeps the blocky look.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("block-texture-sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        log::info!("Created block texture array ({layer_count} layers)");
        Ok(Self {
            texture,
            view,
            sampler,
            layer_count,
        })
    }

    pub fn layer_count(&self) -> u32 {
        self.layer_count
    }
}

/// Paints one layer: `base` RGB jittered per texel by up to `variation`,
/// deterministically from the texel position and `seed`.
pub fn speckled_layer(base: [u8; 3], variation: u8, seed: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(LAYER_BYTES);
    for y in 0..TEXTURE_SIZE {
        for x in 0..TEXTURE_SIZE {
            let h = texel_hash(x, y, seed);
            let jitter = (h % (u32::from(variation) * 2 + 1)) as i32 - i32::from(variation);
            for channel in base {
                data.push((i32::from(channel) + jitter).clamp(0, 255) as u8);
            }
            data.push(255);
        }
    }
    data
}

/// Paints one uniform translucent layer.
pub fn flat_layer(rgba: [u8; 4]) -> Vec<u8> {
    let mut data = Vec::with_capacity(LAYER_BYTES);
    for _ in 0..TEXTURE_SIZE * TEXTURE_SIZE {
        data.extend_from_slice(&rgba);
    }
    data
}

/// Paints a bordered layer: `border` RGB on the outer texel ring, `base`
/// speckle inside. Reads well on lamp blocks.
pub fn bordered_layer(base: [u8; 3], border: [u8; 3], seed: u32) -> Vec<u8> {
    let mut data = speckled_layer(base, 8, seed);
    let edge = TEXTURE_SIZE - 1;
    for y in 0..TEXTURE_SIZE {
        for x in 0..TEXTURE_SIZE {
            if x == 0 || y == 0 || x == edge || y == edge {
                let at = ((y * TEXTURE_SIZE + x) * 4) as usize;
                data[at..at + 3].copy_from_slice(&border);
            }
        }
    }
    data
}

fn texel_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = x
        .wrapping_mul(0x9E37_79B9)
        .wrapping_add(y.wrapping_mul(0x85EB_CA6B))
        .wrapping_add(seed.wrapping_mul(0xC2B2_AE35));
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_device_queue;

    #[test]
    fn test_layers_have_expected_byte_size() {
        assert_eq!(speckled_layer([120, 120, 120], 10, 0).len(), LAYER_BYTES);
        assert_eq!(flat_layer([255, 255, 255, 80]).len(), LAYER_BYTES);
        assert_eq!(bordered_layer([255, 230, 150], [90, 70, 40], 1).len(), LAYER_BYTES);
    }

    #[test]
    fn test_speckle_is_deterministic() {
        assert_eq!(
            speckled_layer([100, 100, 100], 12, 7),
            speckled_layer([100, 100, 100], 12, 7)
        );
        assert_ne!(
            speckled_layer([100, 100, 100], 12, 7),
            speckled_layer([100, 100, 100], 12, 8)
        );
    }

    #[test]
    fn test_speckle_alpha_is_opaque() {
        let layer = speckled_layer([50, 90, 40], 15, 3);
        for texel in layer.chunks(4) {
            assert_eq!(texel[3], 255);
        }
    }

    #[test]
    fn test_empty_layer_list_is_rejected() {
        let Some((device, queue)) = test_device_queue() else {
            return;
        };
        let result = BlockTextures::new(&device, &queue, &[]);
        assert!(matches!(result, Err(TextureError::NoLayers)));
    }

    #[test]
    fn test_wrong_layer_size_is_rejected() {
        let Some((device, queue)) = test_device_queue() else {
            return;
        };
        let layers = vec![vec![0u8; 16]];
        let result = BlockTextures::new(&device, &queue, &layers);
        assert!(matches!(
            result,
            Err(TextureError::LayerSizeMismatch { layer: 0, .. })
        ));
    }

    #[test]
    fn test_array_upload_succeeds() {
        let Some((device, queue)) = test_device_queue() else {
            return;
        };
        let layers = vec![
            speckled_layer([120, 120, 125], 10, 0),
            flat_layer([170, 200, 230, 90]),
        ];
        let textures = BlockTextures::new(&device, &queue, &layers).unwrap();
        assert_eq!(textures.layer_count(), 2);
    }
}
