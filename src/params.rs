//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers live here with:
//! - Units (Hz, dB, logical pixels)
//! - Documented ranges and meanings
//! - The formula each value feeds into

mod audio;
mod motion;
mod pitch;
mod render;
mod session;

// Re-export all types
pub use audio::AnalyzerConfig;
pub use motion::{MotionConfig, StrokeStyle};
pub use pitch::ClassifierConfig;
pub use render::{RenderConfig, VisualizerConfig};
pub use session::SessionConfig;
