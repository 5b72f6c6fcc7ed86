//! Recording session: lifecycle, per-frame tick, clear and resize.
//!
//! All mutation happens through `&mut self` on the thread that owns the
//! session (the window's event loop), so a resize can never interleave
//! with a half-finished tick. The capture device is the only thing
//! touched from another thread, and only through its snapshot call.

use tracing::{debug, info, trace, warn};

use crate::audio::{AudioBackend, FrequencySnapshot, FrequencySource};
use crate::canvas::{DrawingSurface, Segment};
use crate::error::CaptureError;
use crate::motion::{CanvasDimensions, Clock, MotionEngine, Point, SystemClock};
use crate::params::SessionConfig;
use crate::pitch::{classify, Classification};

/// Lifecycle of a recording session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Active,
    Error(String),
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Session not active; nothing pulled, nothing drawn
    Inactive,
    /// Snapshot below the noise floor
    Silent,
    /// Cursor moved and a segment was drawn
    Drew(Segment),
    /// Capture failed at runtime; the session moved to `Error`
    Faulted(CaptureError),
}

/// Owns the capture device, the cursor and the stroke surface
pub struct Session<B: AudioBackend> {
    backend: B,
    config: SessionConfig,
    state: SessionState,
    source: Option<Box<dyn FrequencySource>>,
    motion: MotionEngine,
    surface: DrawingSurface,
    latest: Option<FrequencySnapshot>,
}

impl<B: AudioBackend> Session<B> {
    pub fn new(backend: B, config: SessionConfig, dimensions: CanvasDimensions) -> Self {
        Self::with_clock(backend, config, dimensions, Box::new(SystemClock))
    }

    /// Create a session whose curve motion reads `clock`
    pub fn with_clock(
        backend: B,
        config: SessionConfig,
        dimensions: CanvasDimensions,
        clock: Box<dyn Clock>,
    ) -> Self {
        let motion = MotionEngine::with_clock(config.motion.clone(), dimensions, clock);
        let surface = DrawingSurface::new(dimensions, &config.stroke);
        Self {
            backend,
            config,
            state: SessionState::Idle,
            source: None,
            motion,
            surface,
            latest: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Message of the last failed start or capture fault
    pub fn last_error(&self) -> Option<&str> {
        match &self.state {
            SessionState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn position(&self) -> Point {
        self.motion.position()
    }

    pub fn dimensions(&self) -> CanvasDimensions {
        self.motion.bounds()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DrawingSurface {
        &mut self.surface
    }

    /// Snapshot pulled by the most recent active tick
    pub fn latest_snapshot(&self) -> Option<&FrequencySnapshot> {
        self.latest.as_ref()
    }

    /// Open the microphone and begin recording.
    ///
    /// A no-op while already active. On failure the session enters
    /// `Error` with a user-facing message and the error is returned.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.is_recording() {
            debug!("start() ignored: session already active");
            return Ok(());
        }

        match self.backend.open(&self.config.analyzer) {
            Ok(source) => {
                self.source = Some(source);
                self.latest = None;
                self.state = SessionState::Active;
                self.motion.recenter();
                info!("Recording started");
                Ok(())
            }
            Err(err) => {
                warn!("Could not start recording: {}", err);
                self.state = SessionState::Error(err.to_string());
                Err(err)
            }
        }
    }

    /// Stop recording and release the microphone. Safe to call at any time.
    pub fn stop(&mut self) {
        // Leave Active first so no further tick pulls from the device
        if self.is_recording() {
            self.state = SessionState::Idle;
            info!("Recording stopped");
        }
        self.latest = None;
        if let Some(source) = self.source.take() {
            source.close();
        }
    }

    /// Erase all strokes and recenter the cursor. Does not touch the state.
    pub fn clear(&mut self) {
        self.surface.clear();
        self.motion.recenter();
        debug!("Canvas cleared");
    }

    /// Adopt new logical dimensions; an active session keeps recording.
    pub fn resize(&mut self, width: f32, height: f32) {
        let dimensions = CanvasDimensions::new(width, height);
        self.surface.resize(dimensions);
        self.motion.set_bounds(dimensions);
    }

    /// One display-refresh tick: snapshot, classify, move, draw.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_recording() {
            return TickOutcome::Inactive;
        }
        let Some(source) = self.source.as_mut() else {
            return TickOutcome::Inactive;
        };

        if let Some(err) = source.fault() {
            warn!("Capture failed: {}", err);
            self.state = SessionState::Error(err.to_string());
            self.latest = None;
            if let Some(source) = self.source.take() {
                source.close();
            }
            return TickOutcome::Faulted(err);
        }

        let snapshot = source.snapshot();
        let classification = classify(&snapshot, &self.config.analyzer, &self.config.classifier);
        self.latest = Some(snapshot);

        match classification {
            None => TickOutcome::Silent,
            Some(classification) => TickOutcome::Drew(self.advance(classification)),
        }
    }

    fn advance(&mut self, classification: Classification) -> Segment {
        let Classification {
            direction,
            normalized_volume,
            ..
        } = classification;

        let from = self.motion.position();
        let to = self.motion.step(direction, normalized_volume);
        let segment = Segment {
            from,
            to,
            direction,
            width: self.config.stroke.width_for(normalized_volume),
        };
        self.surface.draw_segment(&segment);
        trace!("{:?} {:?} -> {:?}", direction, from, to);
        segment
    }
}

impl<B: AudioBackend> Drop for Session<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::AnalyzerConfig;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Scripted {
        snapshots: Rc<RefCell<Vec<FrequencySnapshot>>>,
        closed: Rc<RefCell<bool>>,
    }

    impl FrequencySource for Scripted {
        fn snapshot(&mut self) -> FrequencySnapshot {
            let mut queue = self.snapshots.borrow_mut();
            if queue.is_empty() {
                FrequencySnapshot::new(vec![0; 4096])
            } else {
                queue.remove(0)
            }
        }

        fn close(self: Box<Self>) {
            *self.closed.borrow_mut() = true;
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        deny: bool,
        opens: usize,
        snapshots: Rc<RefCell<Vec<FrequencySnapshot>>>,
        closed: Rc<RefCell<bool>>,
    }

    impl AudioBackend for FakeBackend {
        fn open(&mut self, _: &AnalyzerConfig) -> Result<Box<dyn FrequencySource>, CaptureError> {
            if self.deny {
                return Err(CaptureError::PermissionDenied);
            }
            self.opens += 1;
            Ok(Box::new(Scripted {
                snapshots: Rc::clone(&self.snapshots),
                closed: Rc::clone(&self.closed),
            }))
        }
    }

    fn loud_right() -> FrequencySnapshot {
        let mut bins = vec![10u8; 4096];
        bins[27] = 200;
        FrequencySnapshot::new(bins)
    }

    fn session(backend: FakeBackend) -> Session<FakeBackend> {
        Session::new(
            backend,
            SessionConfig::default(),
            CanvasDimensions::new(800.0, 600.0),
        )
    }

    #[test]
    fn test_idle_tick_does_nothing() {
        let mut session = session(FakeBackend::default());

        assert_eq!(session.tick(), TickOutcome::Inactive);
        assert!(session.latest_snapshot().is_none());
    }

    #[test]
    fn test_start_twice_opens_once() {
        let mut session = session(FakeBackend::default());

        session.start().unwrap();
        session.start().unwrap();

        assert!(session.is_recording());
        assert_eq!(session.backend.opens, 1);
    }

    #[test]
    fn test_denied_start_enters_error() {
        let mut session = session(FakeBackend {
            deny: true,
            ..FakeBackend::default()
        });

        assert_eq!(session.start(), Err(CaptureError::PermissionDenied));
        assert!(!session.is_recording());
        assert_eq!(
            session.last_error(),
            Some("Microphone access denied. Please allow microphone access to use this feature.")
        );
        assert_eq!(session.tick(), TickOutcome::Inactive);
    }

    #[test]
    fn test_loud_tick_draws_and_moves() {
        let backend = FakeBackend::default();
        backend.snapshots.borrow_mut().push(loud_right());
        let mut session = session(backend);
        session.start().unwrap();

        let TickOutcome::Drew(segment) = session.tick() else {
            panic!("expected a segment");
        };

        assert_eq!(segment.from, Point::new(400.0, 300.0));
        assert!(segment.to.x > 400.0);
        assert_eq!(segment.to.y, 300.0);
        assert_eq!(segment.width, 2.0);
        assert_eq!(session.position(), segment.to);
        assert!(session.latest_snapshot().is_some());
    }

    #[test]
    fn test_silent_tick_keeps_position() {
        let mut session = session(FakeBackend::default());
        session.start().unwrap();

        assert_eq!(session.tick(), TickOutcome::Silent);
        assert_eq!(session.position(), Point::new(400.0, 300.0));
    }

    #[test]
    fn test_stop_closes_source_and_is_idempotent() {
        let backend = FakeBackend::default();
        let closed = Rc::clone(&backend.closed);
        let mut session = session(backend);

        session.stop();
        assert_eq!(session.state(), &SessionState::Idle);

        session.start().unwrap();
        session.stop();
        session.stop();

        assert!(*closed.borrow());
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.tick(), TickOutcome::Inactive);
    }
}
