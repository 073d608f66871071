//! GPU-side data layouts.
//!
//! Every struct here is `#[repr(C)]` + `Pod` and mirrors a WGSL struct in
//! `pipeline/shaders/chunks`. Field order follows WGSL alignment rules:
//! a `vec3` is always followed by a scalar that fills its fourth lane.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::resources::Material;
use crate::scene::{Camera, Light, LightKind, LightType};

// ============================================================================
// Camera
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    /// xyz = eye position
    pub position: Vec4,
    /// (width, height, 1/width, 1/height)
    pub viewport: Vec4,
}

impl CameraUniforms {
    #[must_use]
    pub fn new(camera: &Camera, width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        Self {
            view: camera.view(),
            projection: camera.projection(),
            view_projection: camera.view_projection(),
            position: camera.position.extend(1.0),
            viewport: Vec4::new(w, h, 1.0 / w, 1.0 / h),
        }
    }
}

// ============================================================================
// Per-draw object data
// ============================================================================

/// Per-draw data bound with a dynamic offset.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: Mat4,
    /// Inverse-transpose of `model` (upper 3×3 used).
    pub normal_matrix: Mat4,
    /// Flat colour for gizmos; unused by the G-buffer programs.
    pub color: Vec4,
}

impl ObjectUniforms {
    #[must_use]
    pub fn new(model: Mat4) -> Self {
        Self {
            model,
            normal_matrix: model.inverse().transpose(),
            color: Vec4::ONE,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color.extend(1.0);
        self
    }
}

// ============================================================================
// Material
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub ambient: Vec4,
    pub diffuse: Vec4,
    /// xyz = specular colour, w = shininess
    pub specular: Vec4,
    /// (height_scale, min_layers, max_layers, unused)
    pub parallax: Vec4,
}

impl From<&Material> for MaterialUniforms {
    fn from(material: &Material) -> Self {
        Self {
            ambient: material.ambient.extend(1.0),
            diffuse: material.diffuse.extend(1.0),
            specular: material.specular.extend(material.shininess),
            parallax: Vec4::new(
                material.height_scale,
                material.min_layers as f32,
                material.max_layers as f32,
                0.0,
            ),
        }
    }
}

// ============================================================================
// Lights
// ============================================================================

pub const LIGHT_TYPE_DIRECTIONAL: u32 = 0;
pub const LIGHT_TYPE_POINT: u32 = 1;
pub const LIGHT_TYPE_SPOT: u32 = 2;

/// One entry of the light storage buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    pub position: [f32; 3],
    pub light_type: u32,
    pub direction: [f32; 3],
    pub cut_off: f32,
    pub ambient: [f32; 3],
    pub outer_cut_off: f32,
    pub diffuse: [f32; 3],
    pub far_plane: f32,
    pub specular: [f32; 3],
    /// 2D layer (directional/spot) or cube slot (point); -1 when unshadowed.
    pub shadow_slot: i32,
    /// (constant, linear, quadratic)
    pub attenuation: [f32; 3],
    pub _pad: f32,
}

impl GpuLight {
    #[must_use]
    pub fn new(light: &Light, shadow_slot: Option<u32>) -> Self {
        let mut gpu = Self {
            ambient: light.ambient.to_array(),
            diffuse: light.diffuse.to_array(),
            specular: light.specular.to_array(),
            shadow_slot: shadow_slot.map_or(-1, |s| s as i32),
            attenuation: [1.0, 0.0, 0.0],
            ..Zeroable::zeroed()
        };
        match &light.kind {
            LightKind::Directional { direction } => {
                gpu.light_type = LIGHT_TYPE_DIRECTIONAL;
                gpu.direction = direction.normalize_or(Vec3::NEG_Y).to_array();
            }
            LightKind::Point {
                position,
                attenuation,
                far_plane,
            } => {
                gpu.light_type = LIGHT_TYPE_POINT;
                gpu.position = position.to_array();
                gpu.attenuation = [attenuation.constant, attenuation.linear, attenuation.quadratic];
                gpu.far_plane = *far_plane;
            }
            LightKind::Spot {
                position,
                direction,
                attenuation,
                cut_off,
                outer_cut_off,
            } => {
                gpu.light_type = LIGHT_TYPE_SPOT;
                gpu.position = position.to_array();
                gpu.direction = direction.normalize_or(Vec3::Z).to_array();
                gpu.attenuation = [attenuation.constant, attenuation.linear, attenuation.quadratic];
                gpu.cut_off = *cut_off;
                gpu.outer_cut_off = *outer_cut_off;
            }
        }
        debug_assert_eq!(
            gpu.light_type,
            match light.light_type() {
                LightType::Directional => LIGHT_TYPE_DIRECTIONAL,
                LightType::Point => LIGHT_TYPE_POINT,
                LightType::Spot => LIGHT_TYPE_SPOT,
            }
        );
        gpu
    }
}

/// Scalar parameters of the lighting pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightingUniforms {
    /// rgb = background for uncovered pixels
    pub clear_color: Vec4,
    pub light_count: u32,
    pub max_shadow_maps: u32,
    pub bright_threshold: f32,
    pub _pad0: f32,
    /// (1/shadow_map_size, 1/point_shadow_map_size, unused, unused)
    pub shadow_texel: Vec4,
}

/// Light-space matrix of one shadow view, bound with a dynamic offset.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShadowViewUniforms {
    pub light_space: Mat4,
}

// ============================================================================
// Post-processing
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SsaoUniforms {
    pub kernel: [Vec4; crate::resources::ssao::SSAO_KERNEL_SIZE],
    /// (noise_scale.x, noise_scale.y, radius, bias)
    pub params: Vec4,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BlurUniforms {
    /// 1 for a horizontal pass, 0 for vertical.
    pub horizontal: u32,
    pub _pad: [u32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ToneMapUniforms {
    pub exposure: f32,
    pub bloom_strength: f32,
    /// 1 when the output format is not sRGB and gamma must be applied.
    pub apply_gamma: u32,
    pub _pad: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct HighlightUniforms {
    pub color: Vec4,
    /// x = outline width
    pub params: Vec4,
}

/// Rounds `size` up to the device's dynamic uniform offset alignment.
#[must_use]
pub fn aligned_stride(size: u64, alignment: u32) -> u64 {
    let alignment = u64::from(alignment.max(1));
    size.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_match_wgsl_sizes() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 224);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 144);
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 64);
        assert_eq!(std::mem::size_of::<GpuLight>(), 96);
        assert_eq!(std::mem::size_of::<LightingUniforms>(), 48);
        assert_eq!(std::mem::size_of::<SsaoUniforms>(), 64 * 16 + 16);
    }

    #[test]
    fn stride_rounds_up() {
        assert_eq!(aligned_stride(144, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(257, 256), 512);
    }

    #[test]
    fn unshadowed_light_has_negative_slot() {
        let gpu = GpuLight::new(&Light::new(LightType::Spot), None);
        assert_eq!(gpu.shadow_slot, -1);
        assert_eq!(gpu.light_type, LIGHT_TYPE_SPOT);
        assert!(gpu.cut_off > gpu.outer_cut_off);
    }
}
