use crate::controller::CameraController;
use crate::permissions::{check_permission_detailed, PermissionInfo};
use crate::session::SessionInfo;
use crate::types::{Platform, SourceEntry};
use tauri::{command, State};

/// Re-enumerate video inputs and repopulate the source selector
#[command]
pub async fn list_sources(controller: State<'_, CameraController>) -> Result<Vec<SourceEntry>, String> {
    let sources = controller.refresh_sources().await;
    log::info!("Found {} sources", sources.len());
    for source in &sources {
        log::debug!("Source: {} - {}", source.device_id, source.label);
    }
    Ok(sources)
}

/// Switch the live stream to another source
#[command]
pub async fn select_source(
    device_id: String,
    controller: State<'_, CameraController>,
) -> Result<SessionInfo, String> {
    log::info!("Selecting source: {}", device_id);
    controller.select_source(&device_id).await.map_err(|e| {
        log::error!("Failed to switch to {}: {}", device_id, e);
        format!("Failed to switch source: {}", e)
    })
}

/// Open the default stream, or `device_id` when given
#[command]
pub async fn start_camera(
    device_id: Option<String>,
    controller: State<'_, CameraController>,
) -> Result<SessionInfo, String> {
    controller
        .open_stream(device_id.as_deref())
        .await
        .map_err(|e| format!("Failed to start camera: {}", e))
}

/// Stop every track of the live stream
#[command]
pub async fn release_camera(controller: State<'_, CameraController>) -> Result<bool, String> {
    let released = controller.release().await;
    if released {
        log::info!("Camera released");
    }
    Ok(released)
}

#[command]
pub async fn get_session_info(
    controller: State<'_, CameraController>,
) -> Result<Option<SessionInfo>, String> {
    Ok(controller.session_info().await)
}

#[command]
pub async fn check_camera_permission() -> Result<PermissionInfo, String> {
    let info = check_permission_detailed();
    log::info!("Camera permission: {}", info.status);
    Ok(info)
}

#[command]
pub async fn get_current_platform() -> Result<Platform, String> {
    Ok(Platform::current())
}
