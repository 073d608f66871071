//! CPU-side texture data.
//!
//! Decoded images waiting for upload. The renderer turns a [`TextureData`]
//! into a `GpuTexture`; a missing or undecodable file is replaced by one of
//! the 1×1 placeholders below so the frame loop never stalls on a bad path.

use crate::resources::material::TextureKind;

/// How 8-bit texel values should be interpreted by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Colour data authored in sRGB (diffuse maps, skyboxes).
    Srgb,
    /// Non-colour data (normal, specular, height maps).
    Linear,
}

impl ColorSpace {
    /// Colour space a texture of `kind` is sampled in.
    #[must_use]
    pub fn for_kind(kind: TextureKind) -> Self {
        match kind {
            TextureKind::Diffuse => Self::Srgb,
            TextureKind::Specular | TextureKind::Normal | TextureKind::Height => Self::Linear,
        }
    }

    #[must_use]
    pub fn rgba8_format(self) -> wgpu::TextureFormat {
        match self {
            Self::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            Self::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Decoded texel data for a 2D texture or a 6-layer cube map.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub label: String,
    pub width: u32,
    pub height: u32,
    /// 1 for 2D textures, 6 for cube maps.
    pub layers: u32,
    pub format: wgpu::TextureFormat,
    /// Tightly packed rows, layer after layer.
    pub data: Vec<u8>,
}

impl TextureData {
    /// 1×1 texture of a single RGBA8 texel.
    #[must_use]
    pub fn solid_color(label: &str, color: [u8; 4], color_space: ColorSpace) -> Self {
        Self {
            label: label.to_string(),
            width: 1,
            height: 1,
            layers: 1,
            format: color_space.rgba8_format(),
            data: color.to_vec(),
        }
    }

    /// Neutral stand-in for a material texture of `kind`.
    ///
    /// White diffuse, no specular, a flat tangent-space normal, zero height.
    #[must_use]
    pub fn placeholder(kind: TextureKind) -> Self {
        let color = match kind {
            TextureKind::Diffuse => [255, 255, 255, 255],
            TextureKind::Specular | TextureKind::Height => [0, 0, 0, 255],
            TextureKind::Normal => [128, 128, 255, 255],
        };
        Self::solid_color(
            &format!("Placeholder {}", kind.name()),
            color,
            ColorSpace::for_kind(kind),
        )
    }

    /// 1×1 cube map with every face set to `color`.
    #[must_use]
    pub fn placeholder_cube(color: [u8; 4]) -> Self {
        Self {
            label: "Placeholder Cube".to_string(),
            width: 1,
            height: 1,
            layers: 6,
            format: ColorSpace::Srgb.rgba8_format(),
            data: color.repeat(6),
        }
    }

    /// Bytes per texel of [`format`](Self::format).
    #[must_use]
    pub fn bytes_per_texel(&self) -> u32 {
        self.format
            .block_copy_size(Some(wgpu::TextureAspect::All))
            .unwrap_or(4)
    }

    #[must_use]
    pub fn is_cube(&self) -> bool {
        self.layers == 6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_single_texels() {
        for kind in TextureKind::ALL {
            let t = TextureData::placeholder(kind);
            assert_eq!((t.width, t.height, t.layers), (1, 1, 1));
            assert_eq!(t.data.len(), 4);
        }
        assert_eq!(
            TextureData::placeholder(TextureKind::Normal).data,
            vec![128, 128, 255, 255]
        );
    }

    #[test]
    fn placeholder_cube_has_six_faces() {
        let cube = TextureData::placeholder_cube([10, 20, 30, 255]);
        assert!(cube.is_cube());
        assert_eq!(cube.data.len(), 24);
    }
}
