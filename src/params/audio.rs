//! Spectral analyzer configuration and bin/frequency conversions.

/// Analyzer settings. The classifier's band edges and thresholds were tuned
/// against exactly these values, so the defaults are not meant to be changed.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Sample rate assumed for every bin <-> Hz conversion (Hz)
    pub sample_rate_hz: u32,

    /// Transform size (samples, power of 2)
    /// 8192 @ 44.1kHz = ~5.4 Hz per bin
    pub fft_size: usize,

    /// Time smoothing between successive snapshots (0.0-1.0)
    pub smoothing: f32,

    /// Magnitude mapped to byte 0 (dB)
    pub min_decibels: f32,

    /// Magnitude mapped to byte 255 (dB)
    pub max_decibels: f32,

    /// Capture channel count (downmixed to mono before analysis)
    pub channels: u16,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            fft_size: 8192,
            smoothing: 0.8,
            min_decibels: -90.0,
            max_decibels: -10.0,
            channels: 1,
        }
    }
}

impl AnalyzerConfig {
    /// Number of magnitude bins in a snapshot (half the transform size)
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Convert frequency (Hz) to bin index, rounding down
    pub fn hz_to_bin(&self, hz: f32) -> usize {
        ((hz as f64 * self.fft_size as f64) / self.sample_rate_hz as f64).floor() as usize
    }

    /// Convert bin index to its frequency (Hz)
    pub fn bin_to_hz(&self, bin: usize) -> f32 {
        (bin as f64 * self.sample_rate_hz as f64 / self.fft_size as f64) as f32
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() {
            return Err(format!(
                "FFT size must be power of 2, got {}",
                self.fft_size
            ));
        }
        if self.sample_rate_hz == 0 {
            return Err("Sample rate must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(format!(
                "Smoothing must be within 0.0-1.0, got {}",
                self.smoothing
            ));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(format!(
                "Decibel floor ({}) must be below ceiling ({})",
                self.min_decibels, self.max_decibels
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hz_to_bin() {
        let config = AnalyzerConfig::default();

        // 44100 / 8192 ≈ 5.38 Hz per bin
        assert_eq!(config.hz_to_bin(0.0), 0);
        assert_eq!(config.hz_to_bin(20.0), 3);
        assert_eq!(config.hz_to_bin(150.0), 27);
        assert_eq!(config.hz_to_bin(2000.0), 371);
    }

    #[test]
    fn test_bin_to_hz() {
        let config = AnalyzerConfig::default();

        assert_eq!(config.bin_to_hz(0), 0.0);
        assert!((config.bin_to_hz(27) - 145.349).abs() < 0.01);
        assert_eq!(config.bin_count(), 4096);
    }

    #[test]
    fn test_validate() {
        assert!(AnalyzerConfig::default().validate().is_ok());

        let bad_size = AnalyzerConfig {
            fft_size: 1000,
            ..AnalyzerConfig::default()
        };
        assert!(bad_size.validate().is_err());

        let bad_range = AnalyzerConfig {
            min_decibels: -10.0,
            max_decibels: -90.0,
            ..AnalyzerConfig::default()
        };
        assert!(bad_range.validate().is_err());
    }
}
