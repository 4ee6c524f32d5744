//! Camera access without a webview.
//!
//! Drives the same controller as the plugin, with a presenter that logs
//! instead of drawing.

pub mod presenter;

pub use presenter::LogPresenter;

use crate::config::SnapCamConfig;
use crate::controller::CameraController;
use crate::enumerator;
use crate::errors::CameraError;
use crate::platform::CaptureBackend;
use crate::types::{SourceEntry, Viewport};
use std::sync::Arc;

/// Viewport assumed when nothing is on screen
pub const HEADLESS_VIEWPORT: Viewport = Viewport {
    width: 1920.0,
    height: 1080.0,
};

/// List all available video sources.
pub fn list_devices(backend: &dyn CaptureBackend) -> Vec<SourceEntry> {
    enumerator::enumerate_sources(backend)
}

/// Build a controller and open a stream on `device_id` (or the default source).
pub async fn open(
    backend: Arc<dyn CaptureBackend>,
    config: SnapCamConfig,
    device_id: Option<&str>,
) -> Result<CameraController, CameraError> {
    let presenter = Arc::new(LogPresenter::new(HEADLESS_VIEWPORT));
    let controller = CameraController::new(backend, presenter, config);
    controller.refresh_sources().await;
    controller.open_stream(device_id).await?;
    Ok(controller)
}
