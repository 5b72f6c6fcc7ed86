//! Microphone capture and spectral analysis.
//!
//! Captures raw mono input through cpal and turns the most recent block of
//! samples into 8-bit frequency-magnitude snapshots on demand.

mod analyzer;
mod source;
mod system;

// Re-export public types
pub use analyzer::{blackman_window, SpectrumAnalyzer};
pub use source::{AudioBackend, FrequencySnapshot, FrequencySource};
pub use system::{InputDeviceInfo, MicrophoneBackend, MicrophoneStream, SampleRing};
