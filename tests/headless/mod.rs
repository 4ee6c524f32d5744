//! Tests for headless camera functionality

#[cfg(feature = "headless")]
mod headless_tests {
    use snapcam::config::SnapCamConfig;
    use snapcam::errors::CameraError;
    use snapcam::headless::{list_devices, open, HEADLESS_VIEWPORT};
    use snapcam::testing::SyntheticBackend;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_list_devices_from_backend() {
        let backend = SyntheticBackend::default();
        let devices = list_devices(&backend);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].label, "Synthetic Front Camera");
    }

    #[test]
    fn test_list_devices_json_shape() {
        let backend = SyntheticBackend::default();
        let json = serde_json::to_value(list_devices(&backend)).unwrap();
        assert_eq!(json[1]["device_id"], "1");
        assert_eq!(json[1]["label"], "Synthetic Back Camera");
    }

    #[tokio::test]
    async fn test_open_specific_device_and_grab() {
        let backend = Arc::new(SyntheticBackend::default());
        let controller = open(backend.clone(), SnapCamConfig::default(), Some("1"))
            .await
            .unwrap();

        let info = controller.session_info().await.unwrap();
        assert_eq!(info.settings.device_id, "1");

        let view = controller.grab_frame().await.unwrap();
        let viewport = HEADLESS_VIEWPORT.scaled_height(0.6);
        assert!(view.geometry.width <= viewport.width);
        assert!(view.geometry.height <= viewport.height);

        controller.shutdown().await;
        assert_eq!(backend.live_track_count(), 0);
    }

    #[tokio::test]
    async fn test_take_photo_to_file() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("shot.jpg");
        let controller = open(Arc::new(SyntheticBackend::default()), SnapCamConfig::default(), None)
            .await
            .unwrap();

        controller.take_photo().await.unwrap();
        let path = controller.save_photo_to_disk(Some(out.clone())).await.unwrap();
        assert_eq!(path, out);
        let photo = image::open(&out).unwrap();
        assert_eq!((photo.width(), photo.height()), (640, 480));
    }

    #[tokio::test]
    async fn test_open_denied() {
        let backend = Arc::new(SyntheticBackend::default());
        backend.set_deny_permission(true);
        let result = open(backend, SnapCamConfig::default(), None).await;
        assert!(matches!(result, Err(CameraError::PermissionDenied(_))));
    }
}
