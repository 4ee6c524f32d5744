use thiserror::Error;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("Device enumeration error: {0}")]
    EnumerationError(String),
    #[error("Permission denied error: {0}")]
    PermissionDenied(String),
    #[error("Stream error: {0}")]
    StreamError(String),
    #[error("No active stream")]
    NoActiveStream,
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    #[error("Capture error: {0}")]
    CaptureError(String),
    #[error("Encoding error: {0}")]
    EncodingError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CameraError {
    /// Whether this failure should be surfaced to the user rather than only logged
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, CameraError::PermissionDenied(_))
    }
}

impl From<std::io::Error> for CameraError {
    fn from(e: std::io::Error) -> Self {
        CameraError::IoError(e.to_string())
    }
}

impl From<image::ImageError> for CameraError {
    fn from(e: image::ImageError) -> Self {
        CameraError::EncodingError(e.to_string())
    }
}
