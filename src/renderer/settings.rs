//! Renderer Settings
//!
//! This module defines the configuration consumed by [`Renderer`](crate::renderer::Renderer).
//!
//! The deferred pipeline has a fixed topology (shadow, G-buffer, SSAO,
//! lighting, highlight, skybox, gizmos, bloom, tone map). Settings only tune
//! the individual stages: shadow-map budget and resolution, SSAO radius,
//! bloom iterations, tone-mapping operator and so on.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use umbra::renderer::RendererSettings;
//!
//! let settings = RendererSettings {
//!     vsync: false,
//!     max_shadow_maps: 4,
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;

use crate::resources::{BloomSettings, SsaoSettings, ToneMappingSettings};

// ---------------------------------------------------------------------------
// PowerPreference
// ---------------------------------------------------------------------------

/// GPU adapter selection preference.
///
/// Mirrors [`wgpu::PowerPreference`] so it can be read from the editor
/// configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum PowerPreference {
    /// Let the platform decide.
    None,
    /// Prefer an integrated GPU (better battery life).
    LowPower,
    /// Prefer a discrete / dedicated GPU.
    #[default]
    HighPerformance,
}

impl From<PowerPreference> for wgpu::PowerPreference {
    fn from(value: PowerPreference) -> Self {
        match value {
            PowerPreference::None => wgpu::PowerPreference::None,
            PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
            PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
        }
    }
}

// ---------------------------------------------------------------------------
// RendererSettings
// ---------------------------------------------------------------------------

/// Global configuration for renderer initialization.
///
/// Shadow-map sizes and the shadow budget are consumed once, when the shadow
/// textures are allocated. Every other field is read each frame and may be
/// changed at runtime through [`Renderer::settings_mut`](crate::renderer::Renderer::settings_mut).
///
/// # Fields
///
/// | Field                   | Description                                   | Default             |
/// |-------------------------|-----------------------------------------------|---------------------|
/// | `vsync`                 | Vertical sync enabled                         | `true`              |
/// | `power_preference`      | GPU adapter selection strategy                | `HighPerformance`   |
/// | `clear_color`           | Background where no geometry or skybox exists | (0.1, 0.1, 0.1)     |
/// | `shadow_map_size`       | Edge length of directional/spot shadow maps   | `2048`              |
/// | `point_shadow_map_size` | Edge length of each point-light cube face     | `1024`              |
/// | `max_shadow_maps`       | Shadow budget `N` (2D pool and cube pool)     | `10`                |
/// | `ssao`                  | Ambient occlusion parameters                  | enabled, r=0.5      |
/// | `bloom`                 | Bloom iterations and strength                 | enabled, 10 passes  |
/// | `tone_mapping`          | Operator and exposure                         | Reinhard, 1.0       |
/// | `bright_threshold`      | Luminance above which pixels seed bloom       | `1.0`               |
/// | `outline_color`         | Selection outline colour (linear HDR)         | orange              |
/// | `outline_width`         | Selection outline extrusion in object units   | `0.03`              |
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    // === Presentation ===
    /// Enable vertical synchronization (VSync).
    pub vsync: bool,

    /// GPU adapter selection preference.
    pub power_preference: PowerPreference,

    /// Background colour written by the lighting pass for uncovered pixels.
    pub clear_color: [f32; 3],

    // === Shadows ===
    /// Resolution of each directional/spot shadow-map layer.
    pub shadow_map_size: u32,

    /// Resolution of each point-light cube face.
    pub point_shadow_map_size: u32,

    /// Shadow-map budget.
    ///
    /// Directional and spot lights share `N` 2D layers (half each); point
    /// lights get `N` cube slots of their own.
    pub max_shadow_maps: u32,

    // === Screen-space & Post-processing ===
    pub ssao: SsaoSettings,
    pub bloom: BloomSettings,
    pub tone_mapping: ToneMappingSettings,

    /// Luminance threshold of the bright-pass output.
    pub bright_threshold: f32,

    // === Editor Overlays ===
    pub outline_color: [f32; 3],
    pub outline_width: f32,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            power_preference: PowerPreference::HighPerformance,
            clear_color: [0.1, 0.1, 0.1],
            shadow_map_size: 2048,
            point_shadow_map_size: 1024,
            max_shadow_maps: 10,
            ssao: SsaoSettings::default(),
            bloom: BloomSettings::default(),
            tone_mapping: ToneMappingSettings::default(),
            bright_threshold: 1.0,
            outline_color: [1.0, 0.55, 0.1],
            outline_width: 0.03,
        }
    }
}

impl RendererSettings {
    /// Number of 2D shadow layers reserved for each of directional and spot
    /// lights.
    #[inline]
    #[must_use]
    pub fn shadow_slots_per_type(&self) -> u32 {
        self.max_shadow_maps / 2
    }

    /// Background colour as a wgpu clear value.
    #[must_use]
    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = self.clear_color;
        wgpu::Color {
            r: f64::from(r),
            g: f64::from(g),
            b: f64::from(b),
            a: 1.0,
        }
    }
}
