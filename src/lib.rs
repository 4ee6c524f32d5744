//! SnapCam: camera preview, frame grab and photo capture for Tauri applications
//!
//! This crate lists the video sources of the machine, keeps one live stream
//! open, and turns user actions into captures shown in the webview.
//!
//! # Features
//! - Source enumeration with generated labels for unnamed cameras
//! - Single live stream; switching sources releases the previous one
//! - Frame grab onto a canvas, with PNG download
//! - Photo capture with a preview-snapshot fallback
//! - JPEG compression of photos to a 2 MiB budget
//! - Aspect-preserving fit of results into the viewport
//!
//! # Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! snapcam = "0.1"
//! tauri = { version = "2.0", features = ["protocol-asset"] }
//! ```
//!
//! Then in your Tauri app:
//! ```rust,ignore
//! use snapcam;
//!
//! fn main() {
//!     tauri::Builder::default()
//!         .plugin(snapcam::init())
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! The page listens for `snapcam://sources`, `snapcam://preview`,
//! `snapcam://frame`, `snapcam://photo`, `snapcam://download` and
//! `snapcam://notice`; image URLs in those payloads resolve through the
//! `snapcam` URI scheme.
pub mod capture;
pub mod commands;
pub mod compress;
pub mod config;
pub mod controller;
pub mod enumerator;
pub mod errors;
#[cfg(feature = "headless")]
pub mod headless;
pub mod permissions;
pub mod platform;
pub mod presentation;
pub mod session;
pub mod sizing;
pub mod store;
pub mod types;
pub mod webview;

// Testing utilities - synthetic backend and recording presenter for offline testing
pub mod testing;

// Re-exports for convenience
pub use config::SnapCamConfig;
pub use controller::CameraController;
pub use errors::CameraError;
pub use platform::{CaptureBackend, NativeBackend, VideoTrack};
pub use presentation::Presenter;
pub use types::{CapturedFrame, EncodedImage, Platform, SourceEntry, Viewport};

use std::sync::Arc;
use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, Runtime,
};

/// Initialize the SnapCam plugin with all commands
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    Builder::new("snapcam")
        .invoke_handler(tauri::generate_handler![
            // Source and stream commands
            commands::init::list_sources,
            commands::init::select_source,
            commands::init::start_camera,
            commands::init::release_camera,
            commands::init::get_session_info,
            commands::init::check_camera_permission,
            commands::init::get_current_platform,
            // Capture commands
            commands::capture::grab_frame,
            commands::capture::take_photo,
            commands::capture::download_frame,
            commands::capture::save_frame_to_disk,
            commands::capture::save_photo_to_disk,
            commands::capture::toggle_fullscreen,
            commands::capture::close_fullscreen,
            // Configuration commands
            commands::config::get_config,
            commands::config::update_config,
            commands::config::reset_config,
        ])
        .setup(|app, _api| {
            let store = Arc::new(store::ImageStore::new());
            let presenter = Arc::new(webview::TauriPresenter::new(app.clone(), store.clone()));
            let controller = CameraController::new(
                Arc::new(NativeBackend::new()),
                presenter,
                SnapCamConfig::load_or_default(),
            )
            .with_image_store(store);

            app.manage(controller.clone());

            tauri::async_runtime::spawn(async move {
                if let Err(e) = controller.start().await {
                    log::warn!("Camera did not start: {}", e);
                }
            });
            Ok(())
        })
        .register_uri_scheme_protocol(store::URI_SCHEME, |ctx, request| {
            webview::serve_image(ctx.app_handle(), &request)
        })
        .build()
}

/// Detect the current platform using the Platform enum
pub fn current_platform() -> Platform {
    Platform::current()
}

/// Initialize logging for the camera system
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "snapcam=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        platform: Platform::current(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub platform: Platform,
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_platform_detection() {
        let platform = current_platform();
        assert_ne!(platform, Platform::Unknown);
    }

    #[test]
    fn test_crate_info() {
        let info = get_info();
        assert_eq!(info.name, "snapcam");
        assert!(!info.version.is_empty());
        assert!(!info.description.is_empty());
    }
}
