use crate::presentation::{FrameView, Notice, PhotoView, Presenter};
use crate::session::SessionInfo;
use crate::store::ImageHandle;
use crate::types::{CapturedFrame, DisplayGeometry, SourceEntry, Viewport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One call received by `RecordingPresenter`
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterCall {
    PopulateSources(Vec<SourceEntry>),
    BindPreview { stream_id: String, geometry: DisplayGeometry },
    DrawFrame(FrameView),
    ShowPhoto(PhotoView),
    RevealDownload(ImageHandle),
    Notify(Notice),
    SetFullscreen(bool),
    SetWrapperVisible(bool),
}

/// Presenter with a fixed viewport that keeps a log of every call
pub struct RecordingPresenter {
    viewport: Viewport,
    fullscreen: AtomicBool,
    wrapper_visible: AtomicBool,
    calls: Mutex<Vec<PresenterCall>>,
}

impl RecordingPresenter {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            fullscreen: AtomicBool::new(false),
            wrapper_visible: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<PresenterCall> {
        self.lock().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                PresenterCall::Notify(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn photos(&self) -> Vec<PhotoView> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                PresenterCall::ShowPhoto(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn frames(&self) -> Vec<FrameView> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                PresenterCall::DrawFrame(f) => Some(f.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn wrapper_visible(&self) -> bool {
        self.wrapper_visible.load(Ordering::SeqCst)
    }

    fn record(&self, call: PresenterCall) {
        self.lock().push(call);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PresenterCall>> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Default for RecordingPresenter {
    fn default() -> Self {
        Self::new(Viewport::new(1000.0, 1000.0))
    }
}

impl Presenter for RecordingPresenter {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn populate_sources(&self, sources: &[SourceEntry]) {
        self.record(PresenterCall::PopulateSources(sources.to_vec()));
    }

    fn bind_preview(&self, session: &SessionInfo, geometry: DisplayGeometry) {
        self.record(PresenterCall::BindPreview {
            stream_id: session.stream_id.clone(),
            geometry,
        });
    }

    fn draw_frame(&self, _frame: &CapturedFrame, view: &FrameView) {
        self.record(PresenterCall::DrawFrame(view.clone()));
    }

    fn show_photo(&self, photo: &PhotoView) {
        self.record(PresenterCall::ShowPhoto(photo.clone()));
    }

    fn reveal_download(&self, handle: &ImageHandle) {
        self.record(PresenterCall::RevealDownload(handle.clone()));
    }

    fn notify(&self, notice: &Notice) {
        self.record(PresenterCall::Notify(notice.clone()));
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen.load(Ordering::SeqCst)
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        self.fullscreen.store(fullscreen, Ordering::SeqCst);
        self.record(PresenterCall::SetFullscreen(fullscreen));
    }

    fn set_fullscreen_wrapper_visible(&self, visible: bool) {
        self.wrapper_visible.store(visible, Ordering::SeqCst);
        self.record(PresenterCall::SetWrapperVisible(visible));
    }
}
