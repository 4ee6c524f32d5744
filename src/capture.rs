//! Frame grab and photo capture against an active session.
//!
//! Both operations are blocking and independent of each other. Photo capture
//! falls back to snapshotting the live preview when the track has no
//! still-capture path; callers cannot tell the two apart.

use crate::compress::encode_jpeg;
use crate::errors::CameraError;
use crate::session::CaptureSession;
use crate::types::{CapturedFrame, EncodedImage};
use image::DynamicImage;

/// Grab one bitmap from the session's track
pub fn grab_frame(session: &CaptureSession) -> Result<CapturedFrame, CameraError> {
    if !session.capabilities().frame_grab {
        return Err(CameraError::Unsupported(
            "frame grab is not supported by this camera".to_string(),
        ));
    }

    let frame = session.track().grab_frame()?;
    if !frame.is_valid() {
        return Err(CameraError::CaptureError(format!(
            "frame data is {} bytes, expected {}x{} RGB",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }
    Ok(frame)
}

/// Take one encoded photo, synthesizing it from the preview when needed
pub fn take_photo(session: &CaptureSession, snapshot_quality: u8) -> Result<EncodedImage, CameraError> {
    if session.capabilities().photo_capture {
        let photo = session.track().take_photo()?;
        log::debug!(
            "Native photo: {}x{} {} bytes",
            photo.width,
            photo.height,
            photo.size_bytes()
        );
        return Ok(photo);
    }

    log::debug!("Photo capture unsupported, snapshotting live preview");
    synthesize_photo(session, snapshot_quality)
}

/// Draw the current preview frame onto an off-screen surface at the stream's
/// native resolution and encode it as JPEG
pub fn synthesize_photo(session: &CaptureSession, quality: u8) -> Result<EncodedImage, CameraError> {
    let track = session.track();
    let settings = track.settings();
    let frame = track.preview_frame()?;

    let bitmap = frame.to_rgb_image().ok_or_else(|| {
        CameraError::CaptureError(format!(
            "preview frame data does not match {}x{}",
            frame.width, frame.height
        ))
    })?;

    let mut surface = image::RgbImage::new(settings.width.max(1), settings.height.max(1));
    if (bitmap.width(), bitmap.height()) == (surface.width(), surface.height()) {
        surface = bitmap;
    } else {
        let scaled = image::imageops::resize(
            &bitmap,
            surface.width(),
            surface.height(),
            image::imageops::FilterType::Triangle,
        );
        image::imageops::replace(&mut surface, &scaled, 0, 0);
    }

    let (width, height) = (surface.width(), surface.height());
    let data = encode_jpeg(&DynamicImage::ImageRgb8(surface), quality)?;
    log::debug!("Synthesized photo: {}x{} {} bytes", width, height, data.len());
    Ok(EncodedImage::jpeg(data, quality, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::CaptureBackend;
    use crate::testing::{SyntheticBackend, SyntheticProfile};
    use crate::types::{CaptureCapabilities, CaptureConstraints};

    fn open_session(backend: &SyntheticBackend) -> CaptureSession {
        let constraints = CaptureConstraints::new(1920, 1080);
        let stream = backend.get_user_media(&constraints).unwrap();
        CaptureSession::new(stream, constraints).unwrap()
    }

    #[test]
    fn test_grab_frame_at_native_resolution() {
        let backend = SyntheticBackend::default();
        let session = open_session(&backend);
        let frame = grab_frame(&session).unwrap();
        assert_eq!((frame.width, frame.height), (640, 480));
        assert!(frame.is_valid());
    }

    #[test]
    fn test_grab_frame_unsupported() {
        let backend = SyntheticBackend::default();
        backend.set_capabilities(CaptureCapabilities {
            frame_grab: false,
            ..CaptureCapabilities::default()
        });
        let session = open_session(&backend);
        assert!(matches!(grab_frame(&session), Err(CameraError::Unsupported(_))));
    }

    #[test]
    fn test_fallback_photo_matches_stream_resolution() {
        let backend = SyntheticBackend::default();
        let session = open_session(&backend);
        let photo = take_photo(&session, 90).unwrap();
        assert_eq!(photo.mime_type, "image/jpeg");
        assert_eq!((photo.width, photo.height), (640, 480));

        let decoded = image::load_from_memory(&photo.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (640, 480));
    }

    #[test]
    fn test_native_photo_used_when_supported() {
        let backend = SyntheticBackend::new(SyntheticProfile {
            capabilities: CaptureCapabilities {
                frame_grab: true,
                photo_capture: true,
                max_photo_width: 1280,
                max_photo_height: 960,
            },
            ..SyntheticProfile::default()
        });
        let session = open_session(&backend);
        let photo = take_photo(&session, 90).unwrap();
        assert_eq!((photo.width, photo.height), (1280, 960));
        assert_eq!(photo.quality, Some(95));
    }

    #[test]
    fn test_capture_failure_propagates() {
        let backend = SyntheticBackend::default();
        let session = open_session(&backend);
        backend.set_fail_captures(true);
        assert!(matches!(grab_frame(&session), Err(CameraError::CaptureError(_))));
        assert!(matches!(take_photo(&session, 90), Err(CameraError::CaptureError(_))));
    }
}
