use crate::presentation::{FrameView, Notice, PhotoView, Presenter};
use crate::session::SessionInfo;
use crate::store::ImageHandle;
use crate::types::{CapturedFrame, DisplayGeometry, SourceEntry, Viewport};
use std::sync::atomic::{AtomicBool, Ordering};

/// Presenter that reports to the log
pub struct LogPresenter {
    viewport: Viewport,
    fullscreen: AtomicBool,
}

impl LogPresenter {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            fullscreen: AtomicBool::new(false),
        }
    }
}

impl Presenter for LogPresenter {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn populate_sources(&self, sources: &[SourceEntry]) {
        for source in sources {
            log::debug!("Source {}: {}", source.device_id, source.label);
        }
    }

    fn bind_preview(&self, session: &SessionInfo, geometry: DisplayGeometry) {
        log::info!(
            "Preview bound to {} ({}) in {:.0}x{:.0}",
            session.label,
            session.stream_id,
            geometry.width,
            geometry.height
        );
    }

    fn draw_frame(&self, frame: &CapturedFrame, view: &FrameView) {
        log::info!(
            "Frame from {} {}x{} displayed at {:.0}x{:.0}",
            frame.device_id,
            view.width,
            view.height,
            view.geometry.width,
            view.geometry.height
        );
    }

    fn show_photo(&self, photo: &PhotoView) {
        log::info!(
            "Photo {} ({} bytes) displayed at {:.0}x{:.0}",
            photo.handle.url,
            photo.handle.size_bytes,
            photo.geometry.width,
            photo.geometry.height
        );
    }

    fn reveal_download(&self, handle: &ImageHandle) {
        log::info!("Download ready at {}", handle.url);
    }

    fn notify(&self, notice: &Notice) {
        log::warn!("{}", notice.message);
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen.load(Ordering::SeqCst)
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        self.fullscreen.store(fullscreen, Ordering::SeqCst);
    }

    fn set_fullscreen_wrapper_visible(&self, visible: bool) {
        log::debug!("Fullscreen wrapper visible: {}", visible);
    }
}
