//! Seams between the session and whatever produces spectra.

use crate::error::CaptureError;
use crate::params::AnalyzerConfig;

/// One magnitude byte per frequency bin, lowest bin first.
///
/// Produced once per tick and not retained beyond the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencySnapshot {
    bins: Vec<u8>,
}

impl FrequencySnapshot {
    pub fn new(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

impl From<Vec<u8>> for FrequencySnapshot {
    fn from(bins: Vec<u8>) -> Self {
        Self::new(bins)
    }
}

/// An open capture device that can be asked for its latest spectrum.
pub trait FrequencySource {
    /// Most recent spectrum. Never blocks on the capture thread for longer
    /// than a buffer copy.
    fn snapshot(&mut self) -> FrequencySnapshot;

    /// A runtime failure reported by the platform since the stream opened
    fn fault(&self) -> Option<CaptureError> {
        None
    }

    /// Release the device. Called after the render loop has stopped.
    fn close(self: Box<Self>) {}
}

/// Opens capture devices on request.
pub trait AudioBackend {
    fn open(&mut self, config: &AnalyzerConfig) -> Result<Box<dyn FrequencySource>, CaptureError>;
}
