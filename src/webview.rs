//! Webview presentation: events to the page and the `snapcam` image scheme.

use crate::controller::CameraController;
use crate::presentation::{encode_png, FrameView, Notice, PhotoView, Presenter};
use crate::session::SessionInfo;
use crate::store::{parse_image_path, ImageHandle, ImageStore, Surface};
use crate::types::{CapturedFrame, DisplayGeometry, SourceEntry, Viewport};
use serde::Serialize;
use std::sync::Arc;
use tauri::http::{Request, Response, StatusCode};
use tauri::{AppHandle, Emitter, Manager, Runtime, WebviewWindow};

pub const EVENT_SOURCES: &str = "snapcam://sources";
pub const EVENT_PREVIEW: &str = "snapcam://preview";
pub const EVENT_FRAME: &str = "snapcam://frame";
pub const EVENT_PHOTO: &str = "snapcam://photo";
pub const EVENT_DOWNLOAD: &str = "snapcam://download";
pub const EVENT_NOTICE: &str = "snapcam://notice";
pub const EVENT_FULLSCREEN_WRAPPER: &str = "snapcam://fullscreen-wrapper";

/// Viewport used when the window cannot report a usable size
pub const FALLBACK_VIEWPORT: Viewport = Viewport {
    width: 1280.0,
    height: 720.0,
};

#[derive(Debug, Clone, Serialize)]
struct PreviewPayload {
    session: SessionInfo,
    geometry: DisplayGeometry,
}

#[derive(Debug, Clone, Serialize)]
struct FramePayload {
    url: String,
    view: FrameView,
}

/// Presenter that forwards everything to the app's webview
pub struct TauriPresenter<R: Runtime> {
    app: AppHandle<R>,
    store: Arc<ImageStore>,
}

impl<R: Runtime> TauriPresenter<R> {
    pub fn new(app: AppHandle<R>, store: Arc<ImageStore>) -> Self {
        Self { app, store }
    }

    fn window(&self) -> Option<WebviewWindow<R>> {
        self.app
            .get_webview_window("main")
            .or_else(|| self.app.webview_windows().into_values().next())
    }

    fn emit<S: Serialize + Clone>(&self, event: &str, payload: S) {
        if let Err(e) = self.app.emit(event, payload) {
            log::warn!("Failed to emit {}: {}", event, e);
        }
    }
}

impl<R: Runtime> Presenter for TauriPresenter<R> {
    fn viewport(&self) -> Viewport {
        let Some(window) = self.window() else {
            return FALLBACK_VIEWPORT;
        };
        match (window.inner_size(), window.scale_factor()) {
            (Ok(size), Ok(scale)) => window_viewport(size.width, size.height, scale),
            _ => FALLBACK_VIEWPORT,
        }
    }

    fn populate_sources(&self, sources: &[SourceEntry]) {
        self.emit(EVENT_SOURCES, sources.to_vec());
    }

    fn bind_preview(&self, session: &SessionInfo, geometry: DisplayGeometry) {
        self.emit(
            EVENT_PREVIEW,
            PreviewPayload {
                session: session.clone(),
                geometry,
            },
        );
    }

    fn draw_frame(&self, frame: &CapturedFrame, view: &FrameView) {
        let Some(bitmap) = frame.to_rgb_image() else {
            log::warn!("Dropping malformed frame from {}", frame.device_id);
            return;
        };
        match encode_png(&bitmap) {
            Ok(png) => {
                let handle = self.store.publish(Surface::Canvas, png);
                self.emit(
                    EVENT_FRAME,
                    FramePayload {
                        url: handle.url,
                        view: view.clone(),
                    },
                );
            }
            Err(e) => log::error!("Failed to encode frame for display: {}", e),
        }
    }

    fn show_photo(&self, photo: &PhotoView) {
        self.emit(EVENT_PHOTO, photo.clone());
    }

    fn reveal_download(&self, handle: &ImageHandle) {
        self.emit(EVENT_DOWNLOAD, handle.clone());
    }

    fn notify(&self, notice: &Notice) {
        self.emit(EVENT_NOTICE, notice.clone());
    }

    fn is_fullscreen(&self) -> bool {
        self.window()
            .and_then(|w| w.is_fullscreen().ok())
            .unwrap_or(false)
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        if let Some(window) = self.window() {
            if let Err(e) = window.set_fullscreen(fullscreen) {
                log::warn!("Failed to set fullscreen={}: {}", fullscreen, e);
            }
        }
    }

    fn set_fullscreen_wrapper_visible(&self, visible: bool) {
        self.emit(EVENT_FULLSCREEN_WRAPPER, visible);
    }
}

/// Logical viewport of a window `width` x `height` physical pixels at `scale`.
///
/// Minimized windows report 0x0; those and bad scale factors get the fallback.
pub fn window_viewport(width: u32, height: u32, scale: f64) -> Viewport {
    if width == 0 || height == 0 || !(scale.is_finite() && scale > 0.0) {
        return FALLBACK_VIEWPORT;
    }
    Viewport::new(width as f64 / scale, height as f64 / scale)
}

/// Serve `snapcam://localhost/<id>.<ext>` from the controller's image store
pub fn serve_image<R: Runtime>(app: &AppHandle<R>, request: &Request<Vec<u8>>) -> Response<Vec<u8>> {
    match app.try_state::<CameraController>() {
        Some(controller) => image_response(&controller.image_store(), request.uri().path()),
        None => {
            log::warn!("Image requested before the camera controller was set up");
            empty_response(StatusCode::NOT_FOUND)
        }
    }
}

/// Response for an image request path such as `/<uuid>.jpg`.
///
/// 200 with the image's content type while its handle is live, 404 otherwise.
pub fn image_response(store: &ImageStore, path: &str) -> Response<Vec<u8>> {
    let Some(image) = parse_image_path(path).and_then(|id| store.get(id)) else {
        log::debug!("No image for {}", path);
        return empty_response(StatusCode::NOT_FOUND);
    };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", image.mime_type.as_str())
        .header("Cache-Control", "no-store")
        .body(image.data.to_vec())
        .unwrap_or_else(|e| {
            log::error!("Failed to build image response: {}", e);
            empty_response(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

fn empty_response(status: StatusCode) -> Response<Vec<u8>> {
    let mut response = Response::new(Vec::new());
    *response.status_mut() = status;
    response
}
