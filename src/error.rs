//! Error types for capture and presentation.

use thiserror::Error;

/// Microphone capture errors.
///
/// None of these are fatal: the session records the message and stays
/// usable (clearing still works, starting can be retried).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The platform refused access to the input device
    #[error("Microphone access denied. Please allow microphone access to use this feature.")]
    PermissionDenied,

    /// No input device, or the device went away
    #[error("Microphone unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device offers no configuration we can analyze
    #[error("Unsupported microphone configuration: {0}")]
    UnsupportedConfig(String),

    /// Stream failed while building, starting or running
    #[error("Microphone stream error: {0}")]
    Stream(String),
}

impl CaptureError {
    /// Classify a backend-specific message, which is the only place some
    /// platforms report a refused permission.
    pub fn from_backend(description: &str) -> Self {
        let lower = description.to_lowercase();
        if lower.contains("permission")
            || lower.contains("denied")
            || lower.contains("not authorized")
        {
            CaptureError::PermissionDenied
        } else {
            CaptureError::Stream(description.to_string())
        }
    }
}

impl From<cpal::BuildStreamError> for CaptureError {
    fn from(err: cpal::BuildStreamError) -> Self {
        match err {
            cpal::BuildStreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable("device not available".to_string())
            }
            cpal::BuildStreamError::StreamConfigNotSupported => {
                CaptureError::UnsupportedConfig("stream config not supported".to_string())
            }
            cpal::BuildStreamError::BackendSpecific { err } => {
                CaptureError::from_backend(&err.description)
            }
            other => CaptureError::Stream(other.to_string()),
        }
    }
}

impl From<cpal::PlayStreamError> for CaptureError {
    fn from(err: cpal::PlayStreamError) -> Self {
        match err {
            cpal::PlayStreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable("device not available".to_string())
            }
            cpal::PlayStreamError::BackendSpecific { err } => {
                CaptureError::from_backend(&err.description)
            }
        }
    }
}

impl From<cpal::StreamError> for CaptureError {
    fn from(err: cpal::StreamError) -> Self {
        match err {
            cpal::StreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable("device disconnected".to_string())
            }
            cpal::StreamError::BackendSpecific { err } => {
                CaptureError::from_backend(&err.description)
            }
        }
    }
}

impl From<cpal::DefaultStreamConfigError> for CaptureError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        match err {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable("device not available".to_string())
            }
            cpal::DefaultStreamConfigError::StreamTypeNotSupported => {
                CaptureError::UnsupportedConfig("input not supported".to_string())
            }
            cpal::DefaultStreamConfigError::BackendSpecific { err } => {
                CaptureError::from_backend(&err.description)
            }
        }
    }
}

impl From<cpal::SupportedStreamConfigsError> for CaptureError {
    fn from(err: cpal::SupportedStreamConfigsError) -> Self {
        match err {
            cpal::SupportedStreamConfigsError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable("device not available".to_string())
            }
            cpal::SupportedStreamConfigsError::InvalidArgument => {
                CaptureError::UnsupportedConfig("invalid argument".to_string())
            }
            cpal::SupportedStreamConfigsError::BackendSpecific { err } => {
                CaptureError::from_backend(&err.description)
            }
        }
    }
}

impl From<cpal::DevicesError> for CaptureError {
    fn from(err: cpal::DevicesError) -> Self {
        match err {
            cpal::DevicesError::BackendSpecific { err } => {
                CaptureError::from_backend(&err.description)
            }
        }
    }
}

/// GPU presentation errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("Failed to find suitable GPU adapter")]
    NoAdapter,

    #[error("Failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_message() {
        assert_eq!(
            CaptureError::PermissionDenied.to_string(),
            "Microphone access denied. Please allow microphone access to use this feature."
        );
    }

    #[test]
    fn test_backend_messages_are_classified() {
        assert_eq!(
            CaptureError::from_backend("Permission denied by the user"),
            CaptureError::PermissionDenied
        );
        assert_eq!(
            CaptureError::from_backend("buffer underrun"),
            CaptureError::Stream("buffer underrun".to_string())
        );
    }

    #[test]
    fn test_render_error_messages() {
        assert_eq!(
            RenderError::NoAdapter.to_string(),
            "Failed to find suitable GPU adapter"
        );
    }

    #[test]
    fn test_missing_device_is_unavailable() {
        let err: CaptureError = cpal::BuildStreamError::DeviceNotAvailable.into();
        assert!(matches!(err, CaptureError::DeviceUnavailable(_)));
    }
}
