//! Session controller: the one place that owns stream, surfaces and policy.

use crate::capture;
use crate::compress::{self, CompressionPolicy, ImageJpegEncoder};
use crate::config::SnapCamConfig;
use crate::enumerator;
use crate::errors::CameraError;
use crate::platform::CaptureBackend;
use crate::presentation::{CanvasSurface, FrameView, Notice, PhotoView, Presenter};
use crate::session::{CaptureSession, SessionInfo, StreamManager};
use crate::sizing;
use crate::store::{ImageHandle, ImageStore, Surface};
use crate::types::{DisplayGeometry, EncodedImage, Platform, SourceEntry, Viewport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Drives enumeration, stream switching, capture and presentation.
///
/// Cloning is cheap; clones share the same session and surfaces.
#[derive(Clone)]
pub struct CameraController {
    streams: Arc<StreamManager>,
    presenter: Arc<dyn Presenter>,
    store: Arc<ImageStore>,
    canvas: Arc<CanvasSurface>,
    config: Arc<RwLock<SnapCamConfig>>,
    sources: Arc<RwLock<Vec<SourceEntry>>>,
}

impl CameraController {
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        presenter: Arc<dyn Presenter>,
        config: SnapCamConfig,
    ) -> Self {
        Self::with_platform(backend, presenter, config, Platform::current())
    }

    /// Controller for an explicit platform class
    pub fn with_platform(
        backend: Arc<dyn CaptureBackend>,
        presenter: Arc<dyn Presenter>,
        config: SnapCamConfig,
        platform: Platform,
    ) -> Self {
        Self {
            streams: Arc::new(StreamManager::new(backend, platform)),
            presenter,
            store: Arc::new(ImageStore::new()),
            canvas: Arc::new(CanvasSurface::new()),
            config: Arc::new(RwLock::new(config)),
            sources: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Share an image store with the presenter (the webview serves images from it)
    pub fn with_image_store(mut self, store: Arc<ImageStore>) -> Self {
        self.store = store;
        self
    }

    pub fn image_store(&self) -> Arc<ImageStore> {
        self.store.clone()
    }

    /// Enumerate sources, then open the default stream
    pub async fn start(&self) -> Result<SessionInfo, CameraError> {
        let sources = self.refresh_sources().await;
        log::info!("Starting with {} source(s)", sources.len());
        self.open_stream(None).await
    }

    /// Re-enumerate devices and repopulate the source list
    pub async fn refresh_sources(&self) -> Vec<SourceEntry> {
        let backend = self.streams.backend();
        let sources = tokio::task::spawn_blocking(move || enumerator::enumerate_sources(backend.as_ref()))
            .await
            .unwrap_or_else(|e| {
                log::warn!("Device enumeration task failed: {}", e);
                Vec::new()
            });

        *self.sources.write().await = sources.clone();
        self.presenter.populate_sources(&sources);
        sources
    }

    pub async fn sources(&self) -> Vec<SourceEntry> {
        self.sources.read().await.clone()
    }

    /// Switch to `device_id`, as the source selector does on change
    pub async fn select_source(&self, device_id: &str) -> Result<SessionInfo, CameraError> {
        self.open_stream(Some(device_id)).await
    }

    /// Release the current stream and open one on `source_id` (or the default)
    pub async fn open_stream(&self, source_id: Option<&str>) -> Result<SessionInfo, CameraError> {
        let config = self.config.read().await.clone();

        let session = match self.streams.open(source_id, &config.stream).await {
            Ok(session) => session,
            Err(e) if e.is_permission_denied() => {
                log::warn!("Camera permission denied: {}", e);
                self.presenter.notify(&Notice::permission_denied());
                return Err(e);
            }
            Err(e) => {
                log::error!("Failed to open stream: {}", e);
                return Err(e);
            }
        };

        let info = session.info();
        let caps = info.capabilities;
        log::info!(
            "Stream {} active on {} at {}x{} (frame grab: {}, photo capture: {}, max photo {}x{})",
            info.stream_id,
            info.label,
            info.settings.width,
            info.settings.height,
            caps.frame_grab,
            caps.photo_capture,
            caps.max_photo_width,
            caps.max_photo_height
        );

        let viewport = self.display_viewport(&config);
        let geometry = DisplayGeometry {
            width: viewport.width,
            height: viewport.height,
        };
        self.presenter.bind_preview(&info, geometry);
        Ok(info)
    }

    /// Release the active stream, if any
    pub async fn release(&self) -> bool {
        self.streams.close().await
    }

    pub async fn is_streaming(&self) -> bool {
        self.streams
            .current()
            .await
            .map(|s| s.is_live())
            .unwrap_or(false)
    }

    pub async fn session_info(&self) -> Option<SessionInfo> {
        self.streams.current().await.map(|s| s.info())
    }

    /// Grab one frame and draw it on the canvas
    pub async fn grab_frame(&self) -> Result<FrameView, CameraError> {
        let session = self.active_session().await?;

        if !session.capabilities().frame_grab {
            log::warn!("Frame grab requested but unsupported by {}", session.info().label);
            self.presenter.notify(&Notice::frame_grab_unsupported());
            return Err(CameraError::Unsupported(
                "frame grab is not supported by this camera".to_string(),
            ));
        }

        let frame = tokio::task::spawn_blocking(move || capture::grab_frame(&session))
            .await
            .map_err(|e| CameraError::CaptureError(format!("Task join error: {}", e)))?
            .inspect_err(|e| log::error!("grab_frame() error: {}", e))?;

        let config = self.config.read().await.clone();
        let geometry = self.fit(frame.width, frame.height, &config)?;

        self.canvas.draw(&frame)?;
        let view = FrameView {
            width: frame.width,
            height: frame.height,
            geometry,
        };
        self.presenter.draw_frame(&frame, &view);
        log::info!(
            "Grabbed frame {}x{} shown at {:.0}x{:.0}",
            frame.width,
            frame.height,
            geometry.width,
            geometry.height
        );
        Ok(view)
    }

    /// Take a photo, compress it to budget and show it with a download link
    pub async fn take_photo(&self) -> Result<PhotoView, CameraError> {
        let session = self.active_session().await?;
        let config = self.config.read().await.clone();
        let viewport = self.display_viewport(&config);

        let snapshot_quality = config.compression.snapshot_quality;
        let photo = tokio::task::spawn_blocking(move || capture::take_photo(&session, snapshot_quality))
            .await
            .map_err(|e| CameraError::CaptureError(format!("Task join error: {}", e)))?
            .inspect_err(|e| log::error!("take_photo() error: {}", e))?;

        log::info!(
            "Took photo: {}x{} {} ({} bytes)",
            photo.width,
            photo.height,
            photo.mime_type,
            photo.size_bytes()
        );

        let (photo, attempts) = if config.compression.enabled {
            let policy = CompressionPolicy::from_config(&config.compression);
            let outcome = tokio::task::spawn_blocking(move || {
                compress::compress_to_budget(&photo, viewport, &policy, &ImageJpegEncoder)
            })
            .await
            .map_err(|e| CameraError::EncodingError(format!("Task join error: {}", e)))?
            .inspect_err(|e| log::error!("Photo compression error: {}", e))?;
            (outcome.image, outcome.attempts)
        } else {
            (photo, 0)
        };

        let geometry = self.fit(photo.width, photo.height, &config)?;
        let handle = self.store.publish(Surface::Photo, photo);
        let view = PhotoView {
            handle,
            geometry,
            compression_attempts: attempts,
        };
        self.presenter.show_photo(&view);
        Ok(view)
    }

    /// Serialize the canvas to PNG and expose it through the download link
    pub async fn download_frame(&self) -> Result<ImageHandle, CameraError> {
        let canvas = self.canvas.clone();
        let png = tokio::task::spawn_blocking(move || canvas.to_png())
            .await
            .map_err(|e| CameraError::EncodingError(format!("Task join error: {}", e)))??;

        let handle = self.store.publish(Surface::Download, png);
        self.presenter.reveal_download(&handle);
        Ok(handle)
    }

    /// Write the canvas as PNG to `path`, or a timestamped file in the output directory
    pub async fn save_frame_to_disk(&self, path: Option<PathBuf>) -> Result<PathBuf, CameraError> {
        let canvas = self.canvas.clone();
        let png = tokio::task::spawn_blocking(move || canvas.to_png())
            .await
            .map_err(|e| CameraError::EncodingError(format!("Task join error: {}", e)))??;
        self.write_image(png, "frame", path).await
    }

    /// Write the photo currently on display to `path`, or a timestamped file
    pub async fn save_photo_to_disk(&self, path: Option<PathBuf>) -> Result<PathBuf, CameraError> {
        let (_, photo) = self
            .store
            .current(Surface::Photo)
            .ok_or_else(|| CameraError::CaptureError("no photo has been taken".to_string()))?;
        self.write_image(photo, "photo", path).await
    }

    /// Reveal the fullscreen wrapper and flip fullscreen state
    pub fn toggle_fullscreen(&self) -> bool {
        self.presenter.set_fullscreen_wrapper_visible(true);
        let fullscreen = !self.presenter.is_fullscreen();
        self.presenter.set_fullscreen(fullscreen);
        fullscreen
    }

    /// Flip fullscreen state and hide the wrapper
    pub fn close_fullscreen(&self) -> bool {
        let fullscreen = self.toggle_fullscreen();
        self.presenter.set_fullscreen_wrapper_visible(false);
        fullscreen
    }

    pub async fn config(&self) -> SnapCamConfig {
        self.config.read().await.clone()
    }

    /// Replace the configuration. Takes effect on the next stream or capture.
    pub async fn update_config(&self, config: SnapCamConfig) -> Result<(), CameraError> {
        config.validate().map_err(CameraError::ConfigError)?;
        *self.config.write().await = config;
        log::info!("Configuration updated");
        Ok(())
    }

    /// Write the active configuration to `path` as TOML
    pub async fn save_config(&self, path: impl AsRef<Path>) -> Result<(), CameraError> {
        let config = self.config.read().await.clone();
        config.save_to_file(path)
    }

    /// Release the stream and drop every stored image
    pub async fn shutdown(&self) {
        self.release().await;
        self.store.clear();
        self.canvas.clear();
    }

    async fn active_session(&self) -> Result<Arc<CaptureSession>, CameraError> {
        match self.streams.current().await {
            Some(session) if session.is_live() => Ok(session),
            _ => {
                log::error!("Capture requested with no active stream");
                Err(CameraError::NoActiveStream)
            }
        }
    }

    fn display_viewport(&self, config: &SnapCamConfig) -> Viewport {
        self.presenter
            .viewport()
            .scaled_height(config.display.viewport_height_fraction)
    }

    fn fit(&self, width: u32, height: u32, config: &SnapCamConfig) -> Result<DisplayGeometry, CameraError> {
        let viewport = self.display_viewport(config);
        sizing::fit_pixels(width, height, viewport).ok_or_else(|| {
            CameraError::CaptureError(format!(
                "cannot fit {}x{} into {}x{}",
                width, height, viewport.width, viewport.height
            ))
        })
    }

    async fn write_image(
        &self,
        image: EncodedImage,
        kind: &str,
        path: Option<PathBuf>,
    ) -> Result<PathBuf, CameraError> {
        let path = match path {
            Some(path) => path,
            None => {
                let storage = self.config.read().await.storage.clone();
                default_capture_path(Path::new(&storage.output_directory), &storage.file_prefix, kind, image.extension())
            }
        };

        let target = path.clone();
        tokio::task::spawn_blocking(move || -> Result<(), CameraError> {
            if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, &image.data)?;
            Ok(())
        })
        .await
        .map_err(|e| CameraError::IoError(format!("Task join error: {}", e)))??;

        log::info!("Saved {} to {}", kind, path.display());
        Ok(path)
    }
}

/// `<dir>/<prefix>_<kind>_<timestamp>.<ext>`
pub fn default_capture_path(dir: &Path, prefix: &str, kind: &str, extension: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
    dir.join(format!("{}_{}_{}.{}", prefix, kind, stamp, extension))
}
