//! Pitch classification band and direction thresholds.

/// Classifier parameters: analysis band, noise floor and the pitch
/// thresholds that select a movement direction.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Lower edge of the analysis band (Hz)
    pub band_min_hz: f32,

    /// Upper edge of the analysis band (Hz), exclusive
    pub band_max_hz: f32,

    /// Normalized average volume at or below which a tick is silent (0.0-1.0)
    pub noise_floor: f32,

    /// Largest 8-bit magnitude, used to normalize the band average
    pub magnitude_max: f32,

    /// Upper bounds (Hz, exclusive) for left, right, up and down.
    /// Anything at or above the last bound curves.
    pub direction_thresholds_hz: [f32; 4],
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            band_min_hz: 20.0,
            band_max_hz: 2000.0,
            noise_floor: 0.02,
            magnitude_max: 255.0,
            direction_thresholds_hz: [120.0, 220.0, 320.0, 420.0],
        }
    }
}
