//! Texture Readback
//!
//! Copies a colour target into a mappable buffer and decodes it to RGBA
//! floats. Used by tests and for debugging; it stalls the GPU.

use half::f16;

use super::WgpuContext;
use super::gpu::RenderTarget;

/// Row pitch required by `copy_texture_to_buffer`.
#[must_use]
pub fn padded_bytes_per_row(width: u32, bytes_per_texel: u32) -> u32 {
    let unpadded = width * bytes_per_texel;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Decodes tightly or padded packed rows of `format` into RGBA floats.
///
/// Single-channel formats are splatted into RGB with alpha 1. Formats the
/// pipeline never reads back decode to zeros.
#[must_use]
pub fn decode_texels(
    format: wgpu::TextureFormat,
    bytes: &[u8],
    width: u32,
    height: u32,
    bytes_per_row: u32,
) -> Vec<[f32; 4]> {
    let mut out = Vec::with_capacity((width * height) as usize);
    for y in 0..height as usize {
        let row = &bytes[y * bytes_per_row as usize..];
        for x in 0..width as usize {
            let texel = match format {
                wgpu::TextureFormat::Rgba16Float => {
                    let t = &row[x * 8..x * 8 + 8];
                    let c = |i: usize| f16::from_le_bytes([t[i * 2], t[i * 2 + 1]]).to_f32();
                    [c(0), c(1), c(2), c(3)]
                }
                wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => {
                    let t = &row[x * 4..x * 4 + 4];
                    [t[0], t[1], t[2], t[3]].map(|v| f32::from(v) / 255.0)
                }
                wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => {
                    let t = &row[x * 4..x * 4 + 4];
                    [t[2], t[1], t[0], t[3]].map(|v| f32::from(v) / 255.0)
                }
                wgpu::TextureFormat::R8Unorm => {
                    let v = f32::from(row[x]) / 255.0;
                    [v, v, v, 1.0]
                }
                _ => [0.0; 4],
            };
            out.push(texel);
        }
    }
    out
}

/// Reads `target` back to the CPU, blocking until the copy completes.
#[must_use]
pub fn read_target(ctx: &WgpuContext, target: &RenderTarget) -> Vec<[f32; 4]> {
    let bytes_per_texel = target
        .format
        .block_copy_size(Some(wgpu::TextureAspect::All))
        .unwrap_or(4);
    let bytes_per_row = padded_bytes_per_row(target.width, bytes_per_texel);

    let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: u64::from(bytes_per_row) * u64::from(target.height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &target.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(target.height),
            },
        },
        wgpu::Extent3d {
            width: target.width,
            height: target.height,
            depth_or_array_layers: 1,
        },
    );
    ctx.queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    slice.map_async(wgpu::MapMode::Read, |result| {
        if let Err(e) = result {
            log::error!("Readback map failed: {e:?}");
        }
    });
    if let Err(e) = ctx.device.poll(wgpu::PollType::wait_indefinitely()) {
        log::error!("Readback poll failed: {e:?}");
    }

    let texels = {
        let data = slice.get_mapped_range();
        decode_texels(target.format, &data, target.width, target.height, bytes_per_row)
    };
    buffer.unmap();
    texels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_copy_alignment() {
        assert_eq!(padded_bytes_per_row(1, 4), 256);
        assert_eq!(padded_bytes_per_row(64, 4), 256);
        assert_eq!(padded_bytes_per_row(65, 4), 512);
        assert_eq!(padded_bytes_per_row(100, 8), 1024);
    }

    #[test]
    fn half_float_texels_decode() {
        let mut bytes = vec![0u8; 256];
        for (i, v) in [1.5f32, -2.0, 0.25, 1.0].into_iter().enumerate() {
            let b = f16::from_f32(v).to_le_bytes();
            bytes[i * 2] = b[0];
            bytes[i * 2 + 1] = b[1];
        }
        let texels = decode_texels(wgpu::TextureFormat::Rgba16Float, &bytes, 1, 1, 256);
        assert_eq!(texels, vec![[1.5, -2.0, 0.25, 1.0]]);
    }

    #[test]
    fn single_channel_splats() {
        let mut bytes = vec![0u8; 512];
        bytes[0] = 255;
        bytes[256] = 0;
        let texels = decode_texels(wgpu::TextureFormat::R8Unorm, &bytes, 1, 2, 256);
        assert_eq!(texels[0], [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(texels[1], [0.0, 0.0, 0.0, 1.0]);
    }
}
