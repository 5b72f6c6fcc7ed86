//! Property tests for cursor motion.

use proptest::prelude::*;

use voice_canvas::motion::{CanvasDimensions, Clock, MotionEngine};
use voice_canvas::params::MotionConfig;
use voice_canvas::pitch::Direction;

struct FixedClock(u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

fn engine(width: f32, height: f32, millis: u64) -> MotionEngine {
    MotionEngine::with_clock(
        MotionConfig::default(),
        CanvasDimensions::new(width, height),
        Box::new(FixedClock(millis)),
    )
}

fn direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

proptest! {
    #[test]
    fn cursor_stays_inside_padding(
        width in 20.0f32..2000.0,
        height in 20.0f32..2000.0,
        millis in any::<u64>(),
        moves in prop::collection::vec((direction(), 0.0f32..=1.0), 1..200),
    ) {
        let mut engine = engine(width, height, millis);
        for (direction, volume) in moves {
            let p = engine.step(direction, volume);
            prop_assert!(p.x >= 10.0 && p.x <= width - 10.0);
            prop_assert!(p.y >= 10.0 && p.y <= height - 10.0);
        }
    }

    #[test]
    fn straight_moves_change_one_axis(
        width in 100.0f32..2000.0,
        height in 100.0f32..2000.0,
        direction in direction().prop_filter("straight", |d| d.is_axis_aligned()),
        volume in 0.03f32..=1.0,
    ) {
        let mut engine = engine(width, height, 0);
        let before = engine.position();
        let after = engine.step(direction, volume);

        let x_moved = after.x != before.x;
        let y_moved = after.y != before.y;
        prop_assert!(x_moved != y_moved);
        prop_assert_eq!(x_moved, matches!(direction, Direction::Left | Direction::Right));
    }

    #[test]
    fn step_never_exceeds_cap(volume in 0.0f32..=1.0) {
        let engine = engine(800.0, 600.0, 0);
        let step = engine.step_length(volume);
        prop_assert!((0.0..=20.0).contains(&step));
    }
}
