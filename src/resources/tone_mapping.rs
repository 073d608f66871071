//! Tone Mapping Configuration
//!
//! Tone mapping modes and settings as pure data. The selected mode is
//! injected into the tone-map shader template as `TONE_MAPPING_MODE`, so
//! switching modes recompiles the pipeline.

use serde::Deserialize;

/// Tone mapping algorithm selection.
///
/// - [`Linear`](ToneMappingMode::Linear): exposure only, clipped
/// - [`Reinhard`](ToneMappingMode::Reinhard): classic operator, soft highlight rolloff
/// - [`Cineon`](ToneMappingMode::Cineon): film emulation with extended range
/// - [`AcesFilmic`](ToneMappingMode::AcesFilmic): industry standard filmic curve
/// - [`Neutral`](ToneMappingMode::Neutral): balanced, film-like response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum ToneMappingMode {
    Linear,
    #[default]
    Reinhard,
    Cineon,
    AcesFilmic,
    Neutral,
}

impl ToneMappingMode {
    /// Value of the `TONE_MAPPING_MODE` template variable.
    #[must_use]
    pub fn template_value(self) -> &'static str {
        match self {
            Self::Linear => "LINEAR",
            Self::Reinhard => "REINHARD",
            Self::Cineon => "CINEON",
            Self::AcesFilmic => "ACES_FILMIC",
            Self::Neutral => "NEUTRAL",
        }
    }

    /// Returns a human-readable name for the mode.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Reinhard => "Reinhard",
            Self::Cineon => "Cineon",
            Self::AcesFilmic => "ACES Filmic",
            Self::Neutral => "Neutral",
        }
    }

    /// Returns all available tone mapping modes.
    #[must_use]
    pub fn all() -> &'static [ToneMappingMode] {
        &[
            Self::Linear,
            Self::Reinhard,
            Self::Cineon,
            Self::AcesFilmic,
            Self::Neutral,
        ]
    }

    /// The mode after `self` in [`all`](Self::all), wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        let all = Self::all();
        let i = all.iter().position(|m| *m == self).unwrap_or(0);
        all[(i + 1) % all.len()]
    }
}

/// Tone mapping configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToneMappingSettings {
    /// Selected tone mapping algorithm
    pub mode: ToneMappingMode,
    /// Exposure multiplier applied before the operator (default: 1.0)
    exposure: f32,
}

impl Default for ToneMappingSettings {
    fn default() -> Self {
        Self {
            mode: ToneMappingMode::default(),
            exposure: 1.0,
        }
    }
}

impl ToneMappingSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn exposure(&self) -> f32 {
        self.exposure
    }

    pub fn set_exposure(&mut self, exposure: f32) {
        self.exposure = exposure.max(0.0);
    }

    pub fn set_mode(&mut self, mode: ToneMappingMode) {
        self.mode = mode;
    }
}
