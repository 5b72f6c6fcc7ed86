//! Live frequency bar chart shown while recording.
//!
//! Uses its own frequency formula and color bands, independent of the
//! classifier's steering thresholds.

use tiny_skia::{Paint, Pixmap, Rect, Transform};

use crate::audio::FrequencySnapshot;
use crate::params::{AnalyzerConfig, VisualizerConfig};

/// One bar of the chart in panel coordinates (logical pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: [u8; 3],
}

/// Frequency assigned to bar `index`. Divides by twice the transform size.
pub fn bar_frequency(index: usize, analyzer: &AnalyzerConfig) -> f32 {
    (index as f64 * analyzer.sample_rate_hz as f64 / (analyzer.fft_size as f64 * 2.0)) as f32
}

/// Color band for a bar frequency
pub fn bar_color(frequency_hz: f32, config: &VisualizerConfig) -> [u8; 3] {
    let [red, teal, blue, green] = config.color_thresholds_hz;
    if frequency_hz < red {
        [0xFF, 0x6B, 0x6B]
    } else if frequency_hz < teal {
        [0x4E, 0xCD, 0xC4]
    } else if frequency_hz < blue {
        [0x45, 0xB7, 0xD1]
    } else if frequency_hz < green {
        [0x96, 0xCE, 0xB4]
    } else {
        [0xFF, 0xEE, 0xAD]
    }
}

/// Lay out bars for a snapshot. Bars past the right edge are omitted.
pub fn layout_bars(
    snapshot: &FrequencySnapshot,
    analyzer: &AnalyzerConfig,
    config: &VisualizerConfig,
) -> Vec<Bar> {
    let bins = snapshot.bins();
    if bins.is_empty() {
        return Vec::new();
    }

    let bar_width = (config.width / bins.len() as f32) * config.bar_width_factor;
    let mut bars = Vec::new();
    let mut x = 0.0;

    for (i, &magnitude) in bins.iter().enumerate() {
        if x >= config.width {
            break;
        }
        let height = (magnitude as f32 / 255.0) * config.height;
        bars.push(Bar {
            x,
            y: config.height - height,
            width: bar_width,
            height,
            color: bar_color(bar_frequency(i, analyzer), config),
        });
        x += bar_width + config.bar_gap;
    }

    bars
}

/// Offscreen panel the chart is painted into
pub struct Visualizer {
    config: VisualizerConfig,
    analyzer: AnalyzerConfig,
    pixmap: Option<Pixmap>,
    density: f32,
}

impl Visualizer {
    pub fn new(config: VisualizerConfig, analyzer: AnalyzerConfig, density: f32) -> Self {
        let pixmap = Pixmap::new(
            (config.width * density).round() as u32,
            (config.height * density).round() as u32,
        );
        Self {
            config,
            analyzer,
            pixmap,
            density,
        }
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    /// Repaint the panel from a snapshot
    pub fn paint(&mut self, snapshot: &FrequencySnapshot) {
        let bars = layout_bars(snapshot, &self.analyzer, &self.config);
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };

        let [r, g, b] = self.config.background_rgb;
        pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, 255));

        let transform = Transform::from_scale(self.density, self.density);
        let mut paint = Paint::default();
        for bar in bars {
            let Some(rect) = Rect::from_xywh(bar.x, bar.y, bar.width, bar.height) else {
                continue;
            };
            let [r, g, b] = bar.color;
            paint.set_color_rgba8(r, g, b, 255);
            pixmap.fill_rect(rect, &paint, transform, None);
        }
    }
}
