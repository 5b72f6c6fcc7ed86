//! FFT spectrum analysis producing 8-bit magnitude snapshots.
//!
//! Each call windows the most recent block of samples, transforms it,
//! smooths magnitudes against the previous call and maps them onto a
//! byte scale between the configured decibel floor and ceiling.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;
use tracing::debug;

use super::source::FrequencySnapshot;
use crate::params::AnalyzerConfig;

/// Stateful spectrum analyzer (owns smoothing history)
pub struct SpectrumAnalyzer {
    config: AnalyzerConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);

        let window = (0..config.fft_size)
            .map(|i| blackman_window(i, config.fft_size))
            .collect();

        debug!(
            "SpectrumAnalyzer created: fft_size={}, smoothing={}, range={}..{} dB",
            config.fft_size, config.smoothing, config.min_decibels, config.max_decibels
        );

        Self {
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); config.fft_size],
            smoothed: vec![0.0; config.bin_count()],
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze the most recent `fft_size` samples.
    ///
    /// Longer input keeps only its tail; shorter input is zero-padded at
    /// the front so the newest sample always lands at the end of the window.
    pub fn analyze(&mut self, samples: &[f32]) -> FrequencySnapshot {
        let n = self.config.fft_size;
        let tail = &samples[samples.len().saturating_sub(n)..];
        let pad = n - tail.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { tail[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let tau = self.config.smoothing;
        let scale = 1.0 / n as f32;
        let db_range = self.config.max_decibels - self.config.min_decibels;

        let bins = self
            .smoothed
            .iter_mut()
            .zip(self.buffer.iter())
            .map(|(smoothed, bin)| {
                let magnitude = bin.norm() * scale;
                let next = tau * *smoothed + (1.0 - tau) * magnitude;
                *smoothed = if next.is_finite() { next } else { 0.0 };

                let db = 20.0 * smoothed.log10();
                let scaled = (255.0 / db_range) * (db - self.config.min_decibels);
                if scaled.is_nan() {
                    0
                } else {
                    scaled.floor().clamp(0.0, 255.0) as u8
                }
            })
            .collect();

        FrequencySnapshot::new(bins)
    }
}

/// Blackman window (alpha = 0.16)
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let a0 = 0.42;
    let a1 = 0.5;
    let a2 = 0.08;
    let x = index as f32 / size as f32;
    a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
}
