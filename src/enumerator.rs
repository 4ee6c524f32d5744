//! Device enumeration for the source selection list.

use crate::platform::CaptureBackend;
use crate::types::{DeviceKind, MediaDeviceInfo, SourceEntry};

/// Turn the platform's device list into selectable camera entries.
///
/// Non-video devices are skipped. A camera without a label (common before
/// permission is granted) is named `Camera N`, N being its 1-based position
/// among the video inputs seen so far.
pub fn label_sources(devices: &[MediaDeviceInfo]) -> Vec<SourceEntry> {
    let mut entries: Vec<SourceEntry> = Vec::new();
    for device in devices {
        log::debug!(
            "Found media device: {} {:?} {:?}",
            device.device_id,
            device.kind,
            device.label
        );
        if device.kind != DeviceKind::VideoInput {
            continue;
        }
        let label = if device.label.trim().is_empty() {
            format!("Camera {}", entries.len() + 1)
        } else {
            device.label.clone()
        };
        entries.push(SourceEntry {
            device_id: device.device_id.clone(),
            label,
        });
    }
    entries
}

/// Query the backend and label its cameras. Failures yield an empty list.
pub fn enumerate_sources(backend: &dyn CaptureBackend) -> Vec<SourceEntry> {
    match backend.enumerate_devices() {
        Ok(devices) => {
            let sources = label_sources(&devices);
            log::info!(
                "Found {} camera(s) among {} device(s) via {}",
                sources.len(),
                devices.len(),
                backend.name()
            );
            sources
        }
        Err(e) => {
            log::warn!("Device enumeration failed: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_names_count_video_inputs_only() {
        let devices = vec![
            MediaDeviceInfo::new("mic", "Built-in Microphone", DeviceKind::AudioInput),
            MediaDeviceInfo::video("a", ""),
            MediaDeviceInfo::new("spk", "", DeviceKind::AudioOutput),
            MediaDeviceInfo::video("b", "USB Webcam"),
            MediaDeviceInfo::video("c", ""),
        ];

        let sources = label_sources(&devices);
        let labels: Vec<_> = sources.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Camera 1", "USB Webcam", "Camera 3"]);
        let ids: Vec<_> = sources.iter().map(|s| s.device_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_device_list() {
        assert!(label_sources(&[]).is_empty());
    }
}
