//! Owned GPU Resources
//!
//! Every GPU object the renderer creates lives inside one of the wrappers
//! below. Dropping a wrapper drops its wgpu handles, which releases the
//! underlying memory, so a half-built set of frame targets is cleaned up by
//! ordinary unwinding.

use wgpu::util::DeviceExt;

use crate::errors::UmbraError;
use crate::resources::{Mesh, TextureData};

// ============================================================================
// Target validation
// ============================================================================

/// Checks that a render target can be attached and sampled.
///
/// This is the wgpu counterpart of a framebuffer completeness check: the
/// format must be renderable on this device, the extent non-zero, and the
/// usage must include `RENDER_ATTACHMENT`.
pub fn validate_target(
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    usage: wgpu::TextureUsages,
    features: wgpu::Features,
) -> Result<(), UmbraError> {
    let incomplete = |reason: String| UmbraError::IncompleteFramebuffer {
        label: label.to_string(),
        reason,
    };

    if width == 0 || height == 0 {
        return Err(incomplete(format!("zero extent {width}x{height}")));
    }
    if !usage.contains(wgpu::TextureUsages::RENDER_ATTACHMENT) {
        return Err(incomplete("usage lacks RENDER_ATTACHMENT".to_string()));
    }
    let allowed = format.guaranteed_format_features(features).allowed_usages;
    if !allowed.contains(wgpu::TextureUsages::RENDER_ATTACHMENT) {
        return Err(incomplete(format!("{format:?} is not renderable")));
    }
    Ok(())
}

// ============================================================================
// RenderTarget
// ============================================================================

/// A texture the pipeline renders into, with its default view.
///
/// Array targets (shadow maps) additionally keep one view per layer so each
/// layer can be bound as a depth attachment.
#[derive(Debug)]
pub struct RenderTarget {
    pub label: String,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub layer_views: Vec<wgpu::TextureView>,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
}

impl RenderTarget {
    /// Creates a sampled 2D render target.
    ///
    /// # Panics
    ///
    /// Panics with [`UmbraError::IncompleteFramebuffer`] when the target
    /// fails validation. Every later pass depends on it, so there is no
    /// meaningful way to keep rendering.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        extra_usage: wgpu::TextureUsages,
    ) -> Self {
        let usage = wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | extra_usage;
        Self::create(device, label, format, width, height, 1, usage, false)
    }

    /// Creates a layered depth target (one attachment view per layer plus a
    /// `D2Array` view for sampling).
    #[must_use]
    pub fn new_array(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        size: u32,
        layers: u32,
    ) -> Self {
        let usage =
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        Self::create(device, label, format, size, size, layers.max(1), usage, true)
    }

    fn create(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        layers: u32,
        usage: wgpu::TextureUsages,
        is_array: bool,
    ) -> Self {
        if let Err(err) = validate_target(label, format, width, height, usage, device.features()) {
            panic!("{err}");
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(if is_array {
                wgpu::TextureViewDimension::D2Array
            } else {
                wgpu::TextureViewDimension::D2
            }),
            ..Default::default()
        });

        let layer_views = if is_array {
            (0..layers)
                .map(|layer| {
                    texture.create_view(&wgpu::TextureViewDescriptor {
                        label: Some(label),
                        dimension: Some(wgpu::TextureViewDimension::D2),
                        base_array_layer: layer,
                        array_layer_count: Some(1),
                        ..Default::default()
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        log::debug!("Created render target '{label}' {width}x{height}x{layers} {format:?}");

        Self {
            label: label.to_string(),
            texture,
            view,
            layer_views,
            format,
            width,
            height,
        }
    }

    /// View of array layer `layer`, or the main view for plain targets.
    #[must_use]
    pub fn layer_view(&self, layer: u32) -> &wgpu::TextureView {
        self.layer_views.get(layer as usize).unwrap_or(&self.view)
    }
}

// ============================================================================
// GpuMesh
// ============================================================================

/// Vertex and index buffers of one registry mesh.
#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    /// Revision of the [`Mesh`] these buffers were built from.
    pub revision: u64,
}

impl GpuMesh {
    #[must_use]
    pub fn upload(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
            revision: mesh.revision(),
        }
    }

    /// Binds the buffers and issues one indexed draw.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.index_count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

// ============================================================================
// GpuTexture
// ============================================================================

/// An uploaded, sampleable texture (2D or cube).
#[derive(Debug)]
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    #[must_use]
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, data: &TextureData) -> Self {
        let size = wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: data.layers,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&data.label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: data.format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(data.width * data.bytes_per_texel()),
                rows_per_image: Some(data.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&data.label),
            dimension: Some(if data.is_cube() {
                wgpu::TextureViewDimension::Cube
            } else {
                wgpu::TextureViewDimension::D2
            }),
            ..Default::default()
        });

        Self { texture, view }
    }
}

// ============================================================================
// GrowableBuffer
// ============================================================================

/// A uniform or storage buffer whose capacity doubles whenever a write
/// would not fit.
///
/// Callers must rebuild any bind group that references the buffer when
/// [`write`](Self::write) reports a reallocation.
#[derive(Debug)]
pub struct GrowableBuffer {
    label: String,
    usage: wgpu::BufferUsages,
    buffer: wgpu::Buffer,
    capacity: u64,
}

impl GrowableBuffer {
    #[must_use]
    pub fn new(device: &wgpu::Device, label: &str, usage: wgpu::BufferUsages, capacity: u64) -> Self {
        let usage = usage | wgpu::BufferUsages::COPY_DST;
        let capacity = capacity.max(256);
        let buffer = Self::allocate(device, label, usage, capacity);
        Self {
            label: label.to_string(),
            usage,
            buffer,
            capacity,
        }
    }

    fn allocate(device: &wgpu::Device, label: &str, usage: wgpu::BufferUsages, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        })
    }

    /// Uploads `bytes`, growing the buffer first if needed.
    ///
    /// Returns `true` when the underlying buffer was replaced.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) -> bool {
        let needed = bytes.len() as u64;
        let mut reallocated = false;
        if needed > self.capacity {
            let mut capacity = self.capacity;
            while capacity < needed {
                capacity *= 2;
            }
            log::debug!(
                "Growing buffer '{}' from {} to {} bytes",
                self.label,
                self.capacity,
                capacity
            );
            self.buffer = Self::allocate(device, &self.label, self.usage, capacity);
            self.capacity = capacity;
            reallocated = true;
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
        reallocated
    }

    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_extent_target_is_incomplete() {
        let err = validate_target(
            "G-Buffer Position",
            wgpu::TextureFormat::Rgba16Float,
            0,
            600,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
            wgpu::Features::empty(),
        )
        .unwrap_err();
        assert!(matches!(err, UmbraError::IncompleteFramebuffer { .. }));
        assert!(err.to_string().contains("G-Buffer Position"));
    }

    #[test]
    fn missing_attachment_usage_is_incomplete() {
        let result = validate_target(
            "HDR",
            wgpu::TextureFormat::Rgba16Float,
            800,
            600,
            wgpu::TextureUsages::TEXTURE_BINDING,
            wgpu::Features::empty(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn pipeline_formats_are_renderable() {
        for format in [
            wgpu::TextureFormat::Rgba16Float,
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureFormat::R8Unorm,
            wgpu::TextureFormat::Depth24PlusStencil8,
            wgpu::TextureFormat::Depth32Float,
        ] {
            validate_target(
                "target",
                format,
                64,
                64,
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                wgpu::Features::empty(),
            )
            .unwrap_or_else(|e| panic!("{format:?}: {e}"));
        }
    }

    #[test]
    fn compressed_formats_are_not_renderable() {
        let result = validate_target(
            "bc",
            wgpu::TextureFormat::Bc1RgbaUnorm,
            64,
            64,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
            wgpu::Features::TEXTURE_COMPRESSION_BC,
        );
        assert!(result.is_err());
    }
}
