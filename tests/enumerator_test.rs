//! Source list labelling

use snapcam::enumerator::{enumerate_sources, label_sources};
use snapcam::testing::{SyntheticBackend, SyntheticProfile};
use snapcam::types::{DeviceKind, MediaDeviceInfo, SourceEntry};

#[test]
fn test_unlabeled_cameras_are_numbered_among_video_inputs() {
    let devices = vec![
        MediaDeviceInfo::new("mic", "Built-in Mic", DeviceKind::AudioInput),
        MediaDeviceInfo::video("a", ""),
        MediaDeviceInfo::new("spk", "", DeviceKind::AudioOutput),
        MediaDeviceInfo::video("b", "USB Camera"),
        MediaDeviceInfo::video("c", "   "),
    ];

    let sources = label_sources(&devices);
    assert_eq!(
        sources,
        vec![
            SourceEntry { device_id: "a".to_string(), label: "Camera 1".to_string() },
            SourceEntry { device_id: "b".to_string(), label: "USB Camera".to_string() },
            SourceEntry { device_id: "c".to_string(), label: "Camera 3".to_string() },
        ]
    );
}

#[test]
fn test_no_video_inputs() {
    let devices = vec![MediaDeviceInfo::new("mic", "Mic", DeviceKind::AudioInput)];
    assert!(label_sources(&devices).is_empty());
}

#[test]
fn test_enumeration_failure_yields_empty_list() {
    let backend = SyntheticBackend::default();
    backend.set_fail_enumeration(true);
    assert!(enumerate_sources(&backend).is_empty());
}

#[test]
fn test_backend_order_is_kept() {
    let backend = SyntheticBackend::new(SyntheticProfile {
        devices: vec![
            MediaDeviceInfo::video("z", "Zed"),
            MediaDeviceInfo::video("a", ""),
        ],
        ..SyntheticProfile::default()
    });
    let sources = enumerate_sources(&backend);
    let ids: Vec<_> = sources.iter().map(|s| s.device_id.as_str()).collect();
    assert_eq!(ids, ["z", "a"]);
    assert_eq!(sources[1].label, "Camera 2");
}
