//! Small helper that owns the one GPU-resident frame texture and
//! replaces its full content from CPU RGBA data. [TextureUploader]
//! lazily allocates the texture on first upload and reuses it while
//! frame dimensions stay the same; a size change recreates texture,
//! view, and bind group together.
//!
//! This avoids allocating a new GPU texture on every frame when the
//! transform keeps its output size stable (the common case).

use relay::RgbaFrame;

use crate::errors::EngineError;

/// Owns exactly one frame texture and its bind group.
///
/// A failed upload leaves the previous texture (and therefore the
/// displayed image) untouched.
pub struct TextureUploader {
    tex: Option<wgpu::Texture>,
    bind_group: Option<wgpu::BindGroup>,
    size: (u32, u32),
}

impl Default for TextureUploader {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureUploader {
    pub fn new() -> Self {
        Self {
            tex: None,
            bind_group: None,
            size: (0, 0),
        }
    }

    /// The bind group for the current texture, if any frame has been
    /// uploaded yet.
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }

    /// Replace the entire texture content with `frame`'s pixels,
    /// (re)creating the texture if the dimensions changed.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        frame: &RgbaFrame,
    ) -> Result<(), EngineError> {
        let (width, height) = (frame.width(), frame.height());

        let expected = width as usize * height as usize * 4;
        if frame.data().len() != expected {
            return Err(EngineError::DataSizeMismatch {
                expected,
                actual: frame.data().len(),
            });
        }

        if self.size != (width, height) || self.tex.is_none() {
            let tex = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("tex/frame"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = tex.create_view(&wgpu::TextureViewDescriptor::default());

            self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("bg/frame"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            }));
            self.tex = Some(tex);
            self.size = (width, height);

            log::debug!("Frame texture (re)created at {width}x{height}.");
        }

        let (padded, bpr) = pad_rows_rgba(frame.data(), width, height);

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: self.tex.as_ref().ok_or(EngineError::TextureNotInitialized)?,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &padded,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bpr),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        Ok(())
    }
}

/// Pads RGBA image data so that each row is aligned to
/// [wgpu::COPY_BYTES_PER_ROW_ALIGNMENT]. Returns the padded data and
/// the new bytes_per_row value.
fn pad_rows_rgba(src: &[u8], width: u32, height: u32) -> (Vec<u8>, u32) {
    let bytes_per_pixel = 4u32;
    let unpadded_bpr = width * bytes_per_pixel;

    // WebGPU requires bytes_per_row % 256 == 0
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded_bpr = unpadded_bpr.div_ceil(align) * align;

    if padded_bpr == unpadded_bpr {
        // Already aligned; no copy needed
        return (src.to_vec(), unpadded_bpr);
    }

    let mut out = vec![0u8; padded_bpr as usize * height as usize];
    for y in 0..height {
        let src_off = (y * unpadded_bpr) as usize;
        let dst_off = (y * padded_bpr) as usize;
        out[dst_off..dst_off + unpadded_bpr as usize]
            .copy_from_slice(&src[src_off..src_off + unpadded_bpr as usize]);
    }
    (out, padded_bpr)
}
