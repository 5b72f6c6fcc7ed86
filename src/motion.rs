//! Cursor motion driven by classified pitch and volume.
//!
//! The engine owns the drawing cursor and advances it one step per
//! non-silent tick. It never draws; the session turns each step into a
//! stroke segment.

use glam::Vec2;
use std::f64::consts::TAU;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::params::MotionConfig;
use crate::pitch::Direction;

/// Drawing cursor position (logical pixels)
pub type Point = Vec2;

/// Logical (unscaled) drawing area
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasDimensions {
    pub width: f32,
    pub height: f32,
}

impl CanvasDimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Source of wall-clock time for curve motion
pub trait Clock {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> u64;
}

/// Reads the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Heading used by curve motion at a given instant (radians).
///
/// The heading turns one radian per second, so a sustained high pitch
/// traces a loop instead of a straight line.
pub fn curve_angle(now_millis: u64) -> f32 {
    ((now_millis as f64 / 1000.0) % TAU) as f32
}

/// Owns the cursor and the bounds it is kept inside
pub struct MotionEngine {
    config: MotionConfig,
    bounds: CanvasDimensions,
    position: Point,
    clock: Box<dyn Clock>,
}

impl MotionEngine {
    /// Create an engine reading the system clock, cursor at the center
    pub fn new(config: MotionConfig, bounds: CanvasDimensions) -> Self {
        Self::with_clock(config, bounds, Box::new(SystemClock))
    }

    pub fn with_clock(config: MotionConfig, bounds: CanvasDimensions, clock: Box<dyn Clock>) -> Self {
        Self {
            config,
            bounds,
            position: bounds.center(),
            clock,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn bounds(&self) -> CanvasDimensions {
        self.bounds
    }

    /// Move the cursor back to the center of the current bounds
    pub fn recenter(&mut self) {
        self.position = self.bounds.center();
    }

    /// Adopt new bounds and recenter
    pub fn set_bounds(&mut self, bounds: CanvasDimensions) {
        self.bounds = bounds;
        self.recenter();
    }

    /// Step length (px) for a normalized volume
    pub fn step_length(&self, normalized_volume: f32) -> f32 {
        let distance = normalized_volume * self.config.distance_scale;
        (distance * self.config.step_multiplier).min(self.config.max_step_px)
    }

    /// Advance the cursor and return its new position.
    pub fn step(&mut self, direction: Direction, normalized_volume: f32) -> Point {
        let step = self.step_length(normalized_volume);
        let Vec2 { x, y } = self.position;

        let moved = match direction {
            Direction::Left => Vec2::new(x - step, y),
            Direction::Right => Vec2::new(x + step, y),
            Direction::Up => Vec2::new(x, y - step),
            Direction::Down => Vec2::new(x, y + step),
            Direction::Curve => {
                let angle = curve_angle(self.clock.now_millis());
                Vec2::new(x + angle.cos() * step, y + angle.sin() * step)
            }
        };

        self.position = self.clamp(moved);
        self.position
    }

    /// Keep a point `edge_padding_px` away from every edge.
    ///
    /// Written as max(lo, min(hi, v)) so a canvas narrower than twice the
    /// padding pins to the low edge instead of panicking.
    fn clamp(&self, point: Point) -> Point {
        let pad = self.config.edge_padding_px;
        Vec2::new(
            pad.max((self.bounds.width - pad).min(point.x)),
            pad.max((self.bounds.height - pad).min(point.y)),
        )
    }
}
