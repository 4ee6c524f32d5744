#[cfg(test)]
mod error_tests {
    use snapcam::errors::CameraError;
    use std::error::Error;

    #[test]
    fn test_camera_error_permission_denied() {
        let error = CameraError::PermissionDenied("Access denied".to_string());
        assert!(error.to_string().contains("Permission denied"));
        assert!(error.to_string().contains("Access denied"));
        assert!(error.is_permission_denied());
    }

    #[test]
    fn test_camera_error_capture() {
        let error = CameraError::CaptureError("Capture failed".to_string());
        assert_eq!(error.to_string(), "Capture error: Capture failed");
        assert!(!error.is_permission_denied());
    }

    #[test]
    fn test_no_active_stream_display() {
        assert_eq!(CameraError::NoActiveStream.to_string(), "No active stream");
    }

    #[test]
    fn test_camera_error_debug_format() {
        let error = CameraError::Unsupported("grabFrame".to_string());
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("Unsupported"));
        assert!(debug_str.contains("grabFrame"));
    }

    #[test]
    fn test_io_permission_error_is_not_camera_denial() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only dir");
        let error: CameraError = io.into();
        assert!(matches!(error, CameraError::IoError(_)));
        assert!(!error.is_permission_denied());
    }

    #[test]
    fn test_image_error_maps_to_encoding() {
        let err = image::load_from_memory(b"not an image").unwrap_err();
        let error: CameraError = err.into();
        assert!(matches!(error, CameraError::EncodingError(_)));
    }

    #[test]
    fn test_camera_error_is_std_error() {
        let error = CameraError::StreamError("NotReadableError".to_string());
        let as_dyn: &dyn Error = &error;
        assert!(as_dyn.source().is_none());
        assert!(as_dyn.to_string().starts_with("Stream error"));
    }
}
