//! Aggregate configuration handed to a drawing session.

use super::{AnalyzerConfig, ClassifierConfig, MotionConfig, StrokeStyle};

/// Everything a session needs to turn snapshots into strokes
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub analyzer: AnalyzerConfig,
    pub classifier: ClassifierConfig,
    pub motion: MotionConfig,
    pub stroke: StrokeStyle,
}
