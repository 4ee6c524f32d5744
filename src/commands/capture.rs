use crate::controller::CameraController;
use crate::presentation::{FrameView, PhotoView};
use crate::store::ImageHandle;
use std::path::PathBuf;
use tauri::{command, State};

/// Grab one frame from the live stream onto the canvas
#[command]
pub async fn grab_frame(controller: State<'_, CameraController>) -> Result<FrameView, String> {
    controller.grab_frame().await.map_err(|e| {
        log::error!("Failed to grab frame: {}", e);
        format!("Failed to grab frame: {}", e)
    })
}

/// Take a photo and show it with a download link
#[command]
pub async fn take_photo(controller: State<'_, CameraController>) -> Result<PhotoView, String> {
    match controller.take_photo().await {
        Ok(view) => {
            log::info!(
                "Photo ready: {}x{} ({} bytes, {} compression attempts)",
                view.handle.width,
                view.handle.height,
                view.handle.size_bytes,
                view.compression_attempts
            );
            Ok(view)
        }
        Err(e) => {
            log::error!("Failed to take photo: {}", e);
            Err(format!("Failed to take photo: {}", e))
        }
    }
}

/// Expose the canvas as a PNG download link
#[command]
pub async fn download_frame(controller: State<'_, CameraController>) -> Result<ImageHandle, String> {
    controller
        .download_frame()
        .await
        .map_err(|e| format!("Failed to prepare download: {}", e))
}

/// Save the canvas as PNG
#[command]
pub async fn save_frame_to_disk(
    file_path: Option<String>,
    controller: State<'_, CameraController>,
) -> Result<String, String> {
    controller
        .save_frame_to_disk(file_path.map(PathBuf::from))
        .await
        .map(|p| p.display().to_string())
        .map_err(|e| format!("Failed to save frame: {}", e))
}

/// Save the displayed photo as JPEG
#[command]
pub async fn save_photo_to_disk(
    file_path: Option<String>,
    controller: State<'_, CameraController>,
) -> Result<String, String> {
    controller
        .save_photo_to_disk(file_path.map(PathBuf::from))
        .await
        .map(|p| p.display().to_string())
        .map_err(|e| format!("Failed to save photo: {}", e))
}

#[command]
pub async fn toggle_fullscreen(controller: State<'_, CameraController>) -> Result<bool, String> {
    Ok(controller.toggle_fullscreen())
}

#[command]
pub async fn close_fullscreen(controller: State<'_, CameraController>) -> Result<bool, String> {
    Ok(controller.close_fullscreen())
}
