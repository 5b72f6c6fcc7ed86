//! Motion and stroke parameters (logical pixels).

/// Mapping from classifier output to cursor movement
#[derive(Debug, Clone)]
pub struct MotionConfig {
    /// Distance per unit of normalized volume (px)
    /// Formula: distance = volume * this_scale
    pub distance_scale: f32,

    /// Step multiplier applied to distance (dimensionless)
    /// Formula: step = min(distance * this_multiplier, max_step_px)
    pub step_multiplier: f32,

    /// Largest single step (px)
    pub max_step_px: f32,

    /// Minimum distance kept between the cursor and each canvas edge (px)
    pub edge_padding_px: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            distance_scale: 100.0,
            step_multiplier: 2.0,
            max_step_px: 20.0,
            edge_padding_px: 10.0,
        }
    }
}

/// Stroke appearance on the drawing surface
#[derive(Debug, Clone)]
pub struct StrokeStyle {
    /// Thinnest stroke drawn (px)
    pub min_width_px: f32,

    /// Width per unit of normalized volume (px)
    /// Formula: width = max(min_width_px, volume * this_scale)
    pub width_scale: f32,

    /// Device pixels per logical pixel on the drawing surface
    pub pixel_density: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            min_width_px: 2.0,
            width_scale: 20.0,
            pixel_density: 2.0,
        }
    }
}

impl StrokeStyle {
    /// Stroke width for a given normalized volume
    pub fn width_for(&self, volume: f32) -> f32 {
        (volume * self.width_scale).max(self.min_width_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_width_has_floor() {
        let style = StrokeStyle::default();

        assert_eq!(style.width_for(0.05), 2.0);
        assert_eq!(style.width_for(0.5), 10.0);
        assert_eq!(style.width_for(1.0), 20.0);
    }
}
