//! Configuration updates and their persistence through the controller

use snapcam::config::SnapCamConfig;
use snapcam::testing::{RecordingPresenter, SyntheticBackend};
use snapcam::CameraController;
use std::sync::Arc;
use tempfile::tempdir;

fn controller() -> CameraController {
    CameraController::new(
        Arc::new(SyntheticBackend::default()),
        Arc::new(RecordingPresenter::default()),
        SnapCamConfig::default(),
    )
}

#[tokio::test]
async fn test_updated_config_saved_and_reloaded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapcam.toml");
    let controller = controller();

    let mut config = SnapCamConfig::default();
    config.display.viewport_height_fraction = 0.75;
    config.compression.max_bytes = 512 * 1024;
    config.storage.file_prefix = "booth".to_string();
    controller.update_config(config.clone()).await.unwrap();
    controller.save_config(&path).await.unwrap();

    let loaded = SnapCamConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(controller.config().await, config);
}

#[tokio::test]
async fn test_reset_to_defaults_overwrites_saved_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapcam.toml");
    let controller = controller();

    let mut config = SnapCamConfig::default();
    config.compression.enabled = false;
    controller.update_config(config).await.unwrap();
    controller.save_config(&path).await.unwrap();

    controller.update_config(SnapCamConfig::default()).await.unwrap();
    controller.save_config(&path).await.unwrap();

    assert_eq!(SnapCamConfig::load_from_file(&path).unwrap(), SnapCamConfig::default());
}

#[tokio::test]
async fn test_rejected_update_leaves_saved_config_alone() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapcam.toml");
    let controller = controller();
    controller.save_config(&path).await.unwrap();

    let mut bad = SnapCamConfig::default();
    bad.compression.second_quality = 90;
    assert!(controller.update_config(bad).await.is_err());
    controller.save_config(&path).await.unwrap();

    assert_eq!(SnapCamConfig::load_from_file(&path).unwrap(), SnapCamConfig::default());
}
