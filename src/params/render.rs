//! Window and visualizer configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Initial window width (logical pixels)
    pub window_width: u32,

    /// Initial window height (logical pixels)
    pub window_height: u32,

    /// Page background behind the strokes (sRGB)
    pub background_rgb: [u8; 3],

    /// Show the live frequency bar chart while recording
    pub show_visualizer: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            background_rgb: [0x11, 0x18, 0x27],
            show_visualizer: true,
        }
    }
}

/// Frequency bar chart panel
#[derive(Debug, Clone)]
pub struct VisualizerConfig {
    /// Panel width (logical pixels)
    pub width: f32,

    /// Panel height (logical pixels)
    pub height: f32,

    /// Distance from the bottom-left window corner (logical pixels)
    pub margin: f32,

    /// Bar width relative to an even split of the panel across all bins
    /// Formula: bar_width = (width / bin_count) * this_factor
    pub bar_width_factor: f32,

    /// Horizontal gap after each bar (logical pixels)
    pub bar_gap: f32,

    /// Panel fill (sRGB)
    pub background_rgb: [u8; 3],

    /// Upper bounds (Hz, exclusive) of the red, teal, blue and green bands.
    /// Deliberately not shared with the classifier thresholds.
    pub color_thresholds_hz: [f32; 4],
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 100.0,
            margin: 16.0,
            bar_width_factor: 2.5,
            bar_gap: 1.0,
            background_rgb: [20, 20, 20],
            color_thresholds_hz: [100.0, 200.0, 300.0, 400.0],
        }
    }
}
