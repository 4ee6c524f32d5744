use crate::config::SnapCamConfig;
use crate::controller::CameraController;
use tauri::{command, State};

/// Get the current configuration
#[command]
pub async fn get_config(controller: State<'_, CameraController>) -> Result<SnapCamConfig, String> {
    Ok(controller.config().await)
}

/// Update configuration
#[command]
pub async fn update_config(
    new_config: SnapCamConfig,
    controller: State<'_, CameraController>,
) -> Result<(), String> {
    controller
        .update_config(new_config)
        .await
        .map_err(|e| e.to_string())?;

    controller
        .save_config(SnapCamConfig::default_path())
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}

/// Reset configuration to defaults
#[command]
pub async fn reset_config(controller: State<'_, CameraController>) -> Result<SnapCamConfig, String> {
    let default_config = SnapCamConfig::default();

    controller
        .update_config(default_config.clone())
        .await
        .map_err(|e| e.to_string())?;

    controller
        .save_config(SnapCamConfig::default_path())
        .await
        .map_err(|e| e.to_string())?;

    Ok(default_config)
}
