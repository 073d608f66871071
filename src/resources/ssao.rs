//! SSAO (Screen Space Ambient Occlusion) Configuration
//!
//! Pure data for the ambient-occlusion stage, following the same pattern as
//! [`BloomSettings`](super::bloom::BloomSettings) and
//! [`ToneMappingSettings`](super::tone_mapping::ToneMappingSettings).
//!
//! # Algorithm
//!
//! 1. A 64-sample hemisphere kernel whose sample lengths grow quadratically
//!    with the sample index, concentrating samples near the origin
//! 2. A 4×4 tiled rotation noise texture that randomizes the kernel
//!    orientation per pixel
//! 3. Range-checked occlusion in view space against the G-buffer position
//! 4. A 4×4 box blur sized to the noise tile

use glam::{Vec2, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::Deserialize;

/// Number of hemisphere samples in the kernel.
pub const SSAO_KERNEL_SIZE: usize = 64;

/// Edge length of the rotation noise tile, also the blur radius.
pub const SSAO_NOISE_DIM: u32 = 4;

// ============================================================================
// SsaoSettings
// ============================================================================

/// SSAO configuration.
///
/// The kernel and noise are generated once by the SSAO pass; only the
/// scalar parameters here are tunable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SsaoSettings {
    /// Whether SSAO is enabled. When disabled the AO target is cleared to 1.
    pub enabled: bool,
    /// Sampling radius in view-space units.
    pub radius: f32,
    /// Depth bias preventing self-occlusion acne.
    pub bias: f32,
}

impl Default for SsaoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 0.5,
            bias: 0.025,
        }
    }
}

impl SsaoSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Sets the sampling radius; clamped to a small positive minimum.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.01);
    }

    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias.max(0.0);
    }

    /// Noise tiling factor for a render target of `width`×`height`.
    #[must_use]
    pub fn noise_scale(width: u32, height: u32) -> Vec2 {
        Vec2::new(
            width as f32 / SSAO_NOISE_DIM as f32,
            height as f32 / SSAO_NOISE_DIM as f32,
        )
    }
}

// ============================================================================
// Kernel & Noise Generation
// ============================================================================

/// Quadratic scale applied to kernel sample `index` out of `count`.
#[inline]
#[must_use]
pub fn kernel_scale(index: usize, count: usize) -> f32 {
    let t = index as f32 / count as f32;
    lerp(0.1, 1.0, t * t)
}

/// Generates a hemisphere sample kernel (tangent space, +Z up).
///
/// Uses a fixed seed so results are identical across frames and sessions.
#[must_use]
pub fn generate_ssao_kernel(samples: usize) -> Vec<Vec4> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut kernel = Vec::with_capacity(samples);

    for i in 0..samples {
        let mut sample = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(0.01..1.0),
        )
        .normalize();

        sample *= rng.random_range(0.0..1.0f32);
        sample *= kernel_scale(i, samples);

        kernel.push(sample.extend(0.0));
    }
    kernel
}

/// Generates the 4×4 rotation noise texture (16 RGBA8 pixels).
///
/// Each texel encodes a random XY rotation vector remapped to [0, 1].
/// Sample it with `Repeat` addressing and `Nearest` filtering.
#[must_use]
pub fn generate_ssao_noise() -> Vec<[u8; 4]> {
    let mut rng = StdRng::seed_from_u64(12345);
    let texels = (SSAO_NOISE_DIM * SSAO_NOISE_DIM) as usize;
    let mut noise = Vec::with_capacity(texels);
    for _ in 0..texels {
        let xy = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            0.0,
        )
        .normalize_or(Vec3::X);

        noise.push([
            ((xy.x * 0.5 + 0.5) * 255.0) as u8,
            ((xy.y * 0.5 + 0.5) * 255.0) as u8,
            0,
            255,
        ]);
    }
    noise
}

fn lerp(a: f32, b: f32, f: f32) -> f32 {
    a + f * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_lies_in_upper_hemisphere() {
        for s in generate_ssao_kernel(SSAO_KERNEL_SIZE) {
            assert!(s.z >= 0.0);
            assert!(s.truncate().length() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn kernel_is_deterministic() {
        assert_eq!(generate_ssao_kernel(16), generate_ssao_kernel(16));
    }

    #[test]
    fn noise_has_one_texel_per_tile_cell() {
        assert_eq!(generate_ssao_noise().len(), 16);
    }
}
