//! Bloom Post-Processing Configuration
//!
//! Pure data for the ping-pong Gaussian bloom, following the same pattern as
//! [`ToneMappingSettings`](super::tone_mapping::ToneMappingSettings).
//!
//! The bright-pass target written by the lighting pass is blurred back and
//! forth between two ping-pong targets, alternating a horizontal and a
//! vertical 9-tap Gaussian. The composite then reads whichever ping-pong
//! target the last iteration wrote; see [`bloom_output_index`].

use serde::Deserialize;

/// One-sided weights of the 9-tap separable Gaussian (centre first).
pub const GAUSSIAN_WEIGHTS: [f32; 5] = [0.227_027, 0.194_594_6, 0.121_621_6, 0.054_054, 0.016_216];

/// Bloom configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BloomSettings {
    /// Whether bloom is enabled. When disabled the composite adds nothing.
    pub enabled: bool,
    /// Number of single-axis blur passes; read through [`iterations`](Self::iterations),
    /// which never reports fewer than one.
    ///
    /// Default: `10`
    iterations: u32,
    /// Multiplier applied to the blurred bright buffer in the composite.
    ///
    /// Default: `1.0`
    strength: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            iterations: 10,
            strength: 1.0,
        }
    }
}

impl BloomSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn iterations(&self) -> u32 {
        // Deserialized settings bypass the setter.
        self.iterations.max(1)
    }

    #[inline]
    #[must_use]
    pub fn strength(&self) -> f32 {
        self.strength.max(0.0)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Sets the blur pass count; at least one pass always runs.
    pub fn set_iterations(&mut self, iterations: u32) {
        self.iterations = iterations.max(1);
    }

    pub fn set_strength(&mut self, strength: f32) {
        self.strength = strength.max(0.0);
    }
}

/// Ping-pong index the composite reads after `iterations` blur passes.
///
/// The orientation flag starts `true` and pass `k` writes `pingpong[flag]`
/// before toggling it, so the last write lands in `pingpong[!flag_after]`:
/// index 1 for odd counts and index 0 for even counts.
#[must_use]
pub fn bloom_output_index(iterations: u32) -> usize {
    let mut horizontal = true;
    for _ in 0..iterations {
        horizontal = !horizontal;
    }
    usize::from(!horizontal)
}

/// Source and destination of blur pass `iteration` (0-based).
///
/// The first pass reads the bright-pass target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurSource {
    Bright,
    PingPong(usize),
}

/// Returns `(source, destination index, horizontal)` for pass `iteration`.
#[must_use]
pub fn blur_step(iteration: u32) -> (BlurSource, usize, bool) {
    let horizontal = iteration % 2 == 0;
    let dst = usize::from(horizontal);
    let src = if iteration == 0 {
        BlurSource::Bright
    } else {
        BlurSource::PingPong(usize::from(!horizontal))
    };
    (src, dst, horizontal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_weights_sum_to_one() {
        let sum = GAUSSIAN_WEIGHTS[0] + 2.0 * GAUSSIAN_WEIGHTS[1..].iter().sum::<f32>();
        assert!((sum - 1.0).abs() < 1e-3, "sum was {sum}");
    }

    #[test]
    fn blur_steps_alternate_targets() {
        assert_eq!(blur_step(0), (BlurSource::Bright, 1, true));
        assert_eq!(blur_step(1), (BlurSource::PingPong(1), 0, false));
        assert_eq!(blur_step(2), (BlurSource::PingPong(0), 1, true));
    }

    #[test]
    fn last_blur_destination_matches_output_index() {
        for n in 1..12 {
            let (_, dst, _) = blur_step(n - 1);
            assert_eq!(dst, bloom_output_index(n), "iterations = {n}");
        }
    }

    #[test]
    fn iterations_never_drop_to_zero() {
        let mut s = BloomSettings::default();
        s.set_iterations(0);
        assert_eq!(s.iterations(), 1);
    }

    #[test]
    fn deserialized_zero_iterations_still_blur_once() {
        let s: BloomSettings = serde_json::from_str(r#"{ "iterations": 0, "strength": -2.0 }"#).unwrap();
        assert_eq!(s.iterations(), 1);
        assert!(s.strength().abs() < f32::EPSILON);

        // The composite reads the target the single pass wrote.
        let (_, dst, _) = blur_step(s.iterations() - 1);
        assert_eq!(bloom_output_index(s.iterations()), dst);
    }
}
