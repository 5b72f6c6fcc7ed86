//! Persistent stroke surface rendered with tiny-skia.
//!
//! Coordinates are logical pixels; the pixmap is allocated at
//! `pixel_density` times the logical size and every stroke is drawn
//! through a matching scale transform. When that would exceed the GPU's
//! largest texture side, the density is lowered so the pixmap fits.

use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::{debug, warn};

use crate::motion::{CanvasDimensions, Point};
use crate::params::StrokeStyle;
use crate::pitch::Direction;

/// Largest texture side wgpu guarantees with default limits
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

/// One line segment emitted by a render tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    pub direction: Direction,
    /// Stroke width (logical pixels)
    pub width: f32,
}

impl Segment {
    pub fn color(&self) -> [u8; 3] {
        self.direction.color()
    }
}

/// Accumulates strokes until cleared or resized
pub struct DrawingSurface {
    pixmap: Option<Pixmap>,
    dimensions: CanvasDimensions,
    /// Requested device pixels per logical pixel
    preferred_density: f32,
    /// Density actually in use, lowered to respect `max_dimension`
    density: f32,
    max_dimension: u32,
    /// Set whenever pixels change; cleared by the presenter after upload
    dirty: bool,
}

impl DrawingSurface {
    pub fn new(dimensions: CanvasDimensions, style: &StrokeStyle) -> Self {
        let preferred_density = style.pixel_density;
        let density = fit_density(dimensions, preferred_density, DEFAULT_MAX_DIMENSION);
        Self {
            pixmap: allocate(dimensions, density, DEFAULT_MAX_DIMENSION),
            dimensions,
            preferred_density,
            density,
            max_dimension: DEFAULT_MAX_DIMENSION,
            dirty: true,
        }
    }

    /// Limit the pixmap to `max_dimension` device pixels per side.
    /// Reallocates (and so clears) only if the density changes.
    pub fn set_max_dimension(&mut self, max_dimension: u32) {
        self.max_dimension = max_dimension.max(1);
        let density = fit_density(self.dimensions, self.preferred_density, self.max_dimension);
        if density != self.density {
            self.resize(self.dimensions);
        }
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    pub fn dimensions(&self) -> CanvasDimensions {
        self.dimensions
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Backing pixmap (premultiplied RGBA), `None` while the canvas is empty-sized
    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Stroke a segment with round caps and joins
    pub fn draw_segment(&mut self, segment: &Segment) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };

        let mut pb = PathBuilder::new();
        pb.move_to(segment.from.x, segment.from.y);
        pb.line_to(segment.to.x, segment.to.y);
        let Some(path) = pb.finish() else {
            return;
        };

        let [r, g, b] = segment.color();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, 255);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: segment.width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        pixmap.stroke_path(
            &path,
            &paint,
            &stroke,
            Transform::from_scale(self.density, self.density),
            None,
        );
        self.dirty = true;
    }

    /// Erase every stroke
    pub fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(tiny_skia::Color::TRANSPARENT);
        }
        self.dirty = true;
    }

    /// Reallocate for new logical dimensions. Existing strokes are dropped,
    /// as resizing a canvas element does.
    pub fn resize(&mut self, dimensions: CanvasDimensions) {
        self.density = fit_density(dimensions, self.preferred_density, self.max_dimension);
        if self.density < self.preferred_density {
            warn!(
                "Drawing surface {}x{} exceeds {}px textures; density lowered to {:.3}",
                dimensions.width, dimensions.height, self.max_dimension, self.density
            );
        }
        debug!(
            "Drawing surface resized to {}x{} (x{})",
            dimensions.width, dimensions.height, self.density
        );
        self.dimensions = dimensions;
        self.pixmap = allocate(dimensions, self.density, self.max_dimension);
        self.dirty = true;
    }
}

/// Highest density up to `preferred` whose pixmap fits `max_dimension`
fn fit_density(dimensions: CanvasDimensions, preferred: f32, max_dimension: u32) -> f32 {
    let longest = dimensions.width.max(dimensions.height);
    let limit = max_dimension as f32;
    if longest * preferred > limit {
        limit / longest
    } else {
        preferred
    }
}

fn allocate(dimensions: CanvasDimensions, density: f32, max_dimension: u32) -> Option<Pixmap> {
    let width = ((dimensions.width * density).round().max(0.0) as u32).min(max_dimension);
    let height = ((dimensions.height * density).round().max(0.0) as u32).min(max_dimension);
    let pixmap = Pixmap::new(width, height);
    if pixmap.is_none() && width > 0 && height > 0 {
        warn!("Could not allocate {}x{} drawing surface", width, height);
    }
    pixmap
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn surface() -> DrawingSurface {
        DrawingSurface::new(CanvasDimensions::new(100.0, 50.0), &StrokeStyle::default())
    }

    fn alpha_at(surface: &DrawingSurface, x: u32, y: u32) -> u8 {
        surface.pixmap().unwrap().pixel(x, y).unwrap().alpha()
    }

    #[test]
    fn test_surface_is_double_density() {
        let surface = surface();
        let pixmap = surface.pixmap().unwrap();

        assert_eq!(pixmap.width(), 200);
        assert_eq!(pixmap.height(), 100);
    }

    #[test]
    fn test_segment_is_drawn_scaled() {
        let mut surface = surface();
        surface.mark_clean();
        surface.draw_segment(&Segment {
            from: Vec2::new(10.0, 25.0),
            to: Vec2::new(90.0, 25.0),
            direction: Direction::Right,
            width: 4.0,
        });

        assert!(surface.is_dirty());
        // Logical (50, 25) lands on device pixel (100, 50)
        assert_eq!(alpha_at(&surface, 100, 50), 255);
        let px = surface.pixmap().unwrap().pixel(100, 50).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (0x4E, 0xCD, 0xC4));
        // Far from the stroke stays empty
        assert_eq!(alpha_at(&surface, 100, 5), 0);
    }

    #[test]
    fn test_clear_erases_strokes() {
        let mut surface = surface();
        surface.draw_segment(&Segment {
            from: Vec2::new(10.0, 10.0),
            to: Vec2::new(40.0, 40.0),
            direction: Direction::Up,
            width: 6.0,
        });
        surface.clear();

        let pixmap = surface.pixmap().unwrap();
        assert!(pixmap.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_resize_reallocates() {
        let mut surface = surface();
        surface.resize(CanvasDimensions::new(30.0, 20.0));

        let pixmap = surface.pixmap().unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (60, 40));
        assert_eq!(surface.dimensions(), CanvasDimensions::new(30.0, 20.0));
    }

    #[test]
    fn test_wide_surface_is_capped_to_texture_limit() {
        let mut surface = surface();
        surface.resize(CanvasDimensions::new(5120.0, 1440.0));

        let pixmap = surface.pixmap().unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (8192, 2304));
        assert!((surface.density() - 1.6).abs() < 1e-6);

        // Strokes still land where their logical coordinates say
        surface.draw_segment(&Segment {
            from: Vec2::new(2500.0, 720.0),
            to: Vec2::new(2620.0, 720.0),
            direction: Direction::Right,
            width: 4.0,
        });
        assert_eq!(alpha_at(&surface, 4096, 1152), 255);
    }

    #[test]
    fn test_lower_device_limit_reallocates() {
        let mut surface = surface();
        surface.set_max_dimension(100);

        let pixmap = surface.pixmap().unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (100, 50));
        assert_eq!(surface.density(), 1.0);

        // Back within limits restores full density
        surface.set_max_dimension(DEFAULT_MAX_DIMENSION);
        assert_eq!(surface.density(), 2.0);
        assert_eq!(surface.pixmap().unwrap().width(), 200);
    }

    #[test]
    fn test_zero_size_surface_ignores_draws() {
        let mut surface =
            DrawingSurface::new(CanvasDimensions::default(), &StrokeStyle::default());
        surface.draw_segment(&Segment {
            from: Vec2::ZERO,
            to: Vec2::new(5.0, 5.0),
            direction: Direction::Left,
            width: 2.0,
        });

        assert!(surface.pixmap().is_none());
    }
}
