//! Display surfaces and user-facing notices.

use crate::errors::CameraError;
use crate::session::SessionInfo;
use crate::store::ImageHandle;
use crate::types::{CapturedFrame, DisplayGeometry, EncodedImage, SourceEntry, Viewport};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    PermissionDenied,
    FrameGrabUnsupported,
}

/// Message shown to the user, typically as an alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn permission_denied() -> Self {
        Self {
            kind: NoticeKind::PermissionDenied,
            message: "Camera access was denied. Allow camera access and reload.".to_string(),
        }
    }

    pub fn frame_grab_unsupported() -> Self {
        Self {
            kind: NoticeKind::FrameGrabUnsupported,
            message: "This camera does not support grabbing frames.".to_string(),
        }
    }
}

/// A frame as drawn on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameView {
    pub width: u32,
    pub height: u32,
    pub geometry: DisplayGeometry,
}

/// A photo as shown on the image surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoView {
    pub handle: ImageHandle,
    pub geometry: DisplayGeometry,
    pub compression_attempts: u8,
}

/// Host UI the controller writes into. Calls are fire-and-forget.
pub trait Presenter: Send + Sync {
    /// Size of the area results are fitted into, before height scaling
    fn viewport(&self) -> Viewport;

    fn populate_sources(&self, sources: &[SourceEntry]);

    /// Attach the live stream to the preview surface and reveal it
    fn bind_preview(&self, session: &SessionInfo, geometry: DisplayGeometry);

    fn draw_frame(&self, frame: &CapturedFrame, view: &FrameView);

    /// Show the photo and its download link
    fn show_photo(&self, photo: &PhotoView);

    /// Point the download affordance at `handle`
    fn reveal_download(&self, handle: &ImageHandle);

    fn notify(&self, notice: &Notice);

    fn is_fullscreen(&self) -> bool;

    fn set_fullscreen(&self, fullscreen: bool);

    fn set_fullscreen_wrapper_visible(&self, visible: bool);
}

/// Encode an RGB bitmap as PNG
pub fn encode_png(bitmap: &image::RgbImage) -> Result<EncodedImage, CameraError> {
    let (width, height) = bitmap.dimensions();
    let mut out = Cursor::new(Vec::new());
    bitmap.write_to(&mut out, image::ImageFormat::Png)?;
    Ok(EncodedImage::png(Bytes::from(out.into_inner()), width, height))
}

/// Bitmap canvas holding the last grabbed frame
#[derive(Default)]
pub struct CanvasSurface {
    bitmap: Mutex<Option<image::RgbImage>>,
}

impl CanvasSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the canvas contents with `frame`, sized to the frame
    pub fn draw(&self, frame: &CapturedFrame) -> Result<(), CameraError> {
        let bitmap = frame.to_rgb_image().ok_or_else(|| {
            CameraError::CaptureError("frame does not match its dimensions".to_string())
        })?;
        *self.lock() = Some(bitmap);
        Ok(())
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.lock().as_ref().map(|b| b.dimensions())
    }

    pub fn is_blank(&self) -> bool {
        self.lock().is_none()
    }

    /// Serialize the canvas as PNG
    pub fn to_png(&self) -> Result<EncodedImage, CameraError> {
        let bitmap = self
            .lock()
            .clone()
            .ok_or_else(|| CameraError::CaptureError("canvas is empty".to_string()))?;

        encode_png(&bitmap)
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<image::RgbImage>> {
        self.bitmap.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_canvas_cannot_download() {
        let canvas = CanvasSurface::new();
        assert!(canvas.is_blank());
        assert!(canvas.to_png().is_err());
    }

    #[test]
    fn test_canvas_png_matches_frame() {
        let canvas = CanvasSurface::new();
        let frame = CapturedFrame::new(vec![200; 8 * 6 * 3], 8, 6, "cam".to_string());
        canvas.draw(&frame).unwrap();
        assert_eq!(canvas.dimensions(), Some((8, 6)));

        let png = canvas.to_png().unwrap();
        assert_eq!(png.mime_type, "image/png");
        let decoded = image::load_from_memory(&png.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn test_bad_frame_leaves_canvas_untouched() {
        let canvas = CanvasSurface::new();
        let good = CapturedFrame::new(vec![0; 2 * 2 * 3], 2, 2, "cam".to_string());
        canvas.draw(&good).unwrap();

        let bad = CapturedFrame::new(vec![0; 3], 2, 2, "cam".to_string());
        assert!(canvas.draw(&bad).is_err());
        assert_eq!(canvas.dimensions(), Some((2, 2)));
    }
}
