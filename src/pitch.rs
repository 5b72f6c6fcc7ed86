//! Dominant-pitch classification.
//!
//! A snapshot is reduced to two numbers over the analysis band: the bin
//! with the largest magnitude (which picks a direction) and the mean
//! magnitude (which becomes the loudness). Quiet ticks are dropped.

use tracing::trace;

use crate::audio::FrequencySnapshot;
use crate::params::{AnalyzerConfig, ClassifierConfig};

/// Movement direction selected by pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    Curve,
}

impl Direction {
    pub const ALL: [Direction; 5] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
        Direction::Curve,
    ];

    /// Stroke color drawn for this direction (sRGB)
    pub fn color(self) -> [u8; 3] {
        match self {
            Direction::Left => [0xFF, 0x6B, 0x6B],
            Direction::Right => [0x4E, 0xCD, 0xC4],
            Direction::Up => [0x45, 0xB7, 0xD1],
            Direction::Down => [0x96, 0xCE, 0xB4],
            Direction::Curve => [0xFF, 0xEE, 0xAD],
        }
    }

    /// True for the four directions that move along a single axis
    pub fn is_axis_aligned(self) -> bool {
        self != Direction::Curve
    }
}

/// Output of one non-silent analysis tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub direction: Direction,
    /// Mean band magnitude scaled to 0.0-1.0
    pub normalized_volume: f32,
    /// Frequency of the loudest bin (Hz)
    pub frequency_hz: f32,
}

/// Map a frequency onto a direction.
///
/// Each threshold is an exclusive upper bound, so a frequency exactly on a
/// boundary belongs to the band above it.
pub fn direction_for_frequency(frequency_hz: f32, config: &ClassifierConfig) -> Direction {
    let [left, right, up, down] = config.direction_thresholds_hz;
    if frequency_hz < left {
        Direction::Left
    } else if frequency_hz < right {
        Direction::Right
    } else if frequency_hz < up {
        Direction::Up
    } else if frequency_hz < down {
        Direction::Down
    } else {
        Direction::Curve
    }
}

/// Classify a snapshot, returning `None` when the tick is silent.
///
/// The band is `[hz_to_bin(min), hz_to_bin(max))`, trimmed to the snapshot
/// length. An empty band is treated as silence.
pub fn classify(
    snapshot: &FrequencySnapshot,
    analyzer: &AnalyzerConfig,
    config: &ClassifierConfig,
) -> Option<Classification> {
    let bins = snapshot.bins();
    let min_bin = analyzer.hz_to_bin(config.band_min_hz);
    let max_bin = analyzer.hz_to_bin(config.band_max_hz).min(bins.len());

    if max_bin <= min_bin {
        return None;
    }

    let band = &bins[min_bin..max_bin];

    let mut max_value = 0u8;
    let mut max_index = 0usize;
    let mut total: u64 = 0;
    for (offset, &magnitude) in band.iter().enumerate() {
        // Strictly greater: first occurrence wins ties
        if magnitude > max_value {
            max_value = magnitude;
            max_index = min_bin + offset;
        }
        total += u64::from(magnitude);
    }

    let average = total as f32 / band.len() as f32;
    let normalized_volume = average / config.magnitude_max;

    if normalized_volume <= config.noise_floor {
        return None;
    }

    let frequency_hz = analyzer.bin_to_hz(max_index);
    let direction = direction_for_frequency(frequency_hz, config);

    trace!(
        "peak bin {} ({:.1} Hz, {}) volume {:.3} -> {:?}",
        max_index,
        frequency_hz,
        max_value,
        normalized_volume,
        direction
    );

    Some(Classification {
        direction,
        normalized_volume,
        frequency_hz,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(floor: u8, peaks: &[(usize, u8)]) -> FrequencySnapshot {
        let mut bins = vec![floor; 4096];
        for &(bin, value) in peaks {
            bins[bin] = value;
        }
        FrequencySnapshot::new(bins)
    }

    #[test]
    fn test_direction_boundaries() {
        let config = ClassifierConfig::default();

        assert_eq!(direction_for_frequency(0.0, &config), Direction::Left);
        assert_eq!(direction_for_frequency(119.99, &config), Direction::Left);
        assert_eq!(direction_for_frequency(120.0, &config), Direction::Right);
        assert_eq!(direction_for_frequency(220.0, &config), Direction::Up);
        assert_eq!(direction_for_frequency(320.0, &config), Direction::Down);
        assert_eq!(direction_for_frequency(419.99, &config), Direction::Down);
        assert_eq!(direction_for_frequency(420.0, &config), Direction::Curve);
        assert_eq!(direction_for_frequency(22049.0, &config), Direction::Curve);
    }

    #[test]
    fn test_all_zero_is_silent() {
        let snapshot = snapshot_with(0, &[]);
        let result = classify(
            &snapshot,
            &AnalyzerConfig::default(),
            &ClassifierConfig::default(),
        );

        assert!(result.is_none());
    }

    #[test]
    fn test_noise_floor_is_inclusive() {
        // Band is bins 3..371 (368 bins); a total of 0.02 * 255 * 368 sits
        // exactly on the floor.
        let analyzer = AnalyzerConfig::default();
        let config = ClassifierConfig::default();
        let mut bins = vec![0u8; 4096];
        // 5 * 368 = 1840 < 1876.8; 6 * 368 = 2208 > 1876.8
        for bin in bins.iter_mut().take(371).skip(3) {
            *bin = 5;
        }
        assert!(classify(&FrequencySnapshot::new(bins.clone()), &analyzer, &config).is_none());

        for bin in bins.iter_mut().take(371).skip(3) {
            *bin = 6;
        }
        assert!(classify(&FrequencySnapshot::new(bins), &analyzer, &config).is_some());
    }

    #[test]
    fn test_volume_is_band_average_not_peak() {
        let analyzer = AnalyzerConfig::default();
        let config = ClassifierConfig::default();

        // A lone loud bin is not enough: the average stays under the floor
        let lone = snapshot_with(0, &[(27, 200)]);
        assert!(classify(&lone, &analyzer, &config).is_none());

        // Over a uniform floor of 10 the 150 Hz peak steers right
        let snapshot = snapshot_with(10, &[(27, 200)]);
        let result = classify(&snapshot, &analyzer, &config).unwrap();

        let expected = ((10.0 * 367.0 + 200.0) / 368.0) / 255.0;
        assert_eq!(result.direction, Direction::Right);
        assert!((result.normalized_volume - expected).abs() < 1e-6);
        assert!((result.frequency_hz - 145.349).abs() < 0.01);
    }

    #[test]
    fn test_first_peak_wins_ties() {
        let analyzer = AnalyzerConfig::default();
        let config = ClassifierConfig::default();
        // bin 10 ≈ 53.8 Hz (left), bin 50 ≈ 269 Hz (up)
        let snapshot = snapshot_with(20, &[(10, 180), (50, 180)]);

        let result = classify(&snapshot, &analyzer, &config).unwrap();
        assert_eq!(result.direction, Direction::Left);
    }

    #[test]
    fn test_out_of_band_peaks_are_ignored() {
        let analyzer = AnalyzerConfig::default();
        let config = ClassifierConfig::default();
        // bins below 3 and at/after 371 sit outside the band
        let snapshot = snapshot_with(20, &[(1, 255), (371, 255), (80, 90)]);

        let result = classify(&snapshot, &analyzer, &config).unwrap();
        assert_eq!(result.direction, Direction::Curve);
        assert!((result.frequency_hz - analyzer.bin_to_hz(80)).abs() < 1e-3);
    }

    #[test]
    fn test_short_snapshot_is_silent() {
        let snapshot = FrequencySnapshot::new(vec![255; 3]);
        let result = classify(
            &snapshot,
            &AnalyzerConfig::default(),
            &ClassifierConfig::default(),
        );

        assert!(result.is_none());
    }

    #[test]
    fn test_direction_colors() {
        assert_eq!(Direction::Left.color(), [0xFF, 0x6B, 0x6B]);
        assert_eq!(Direction::Curve.color(), [0xFF, 0xEE, 0xAD]);
        assert!(!Direction::Curve.is_axis_aligned());
    }
}
