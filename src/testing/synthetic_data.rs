//! Synthetic camera for offline testing
//!
//! `SyntheticBackend` behaves like a platform capture stack without
//! hardware: it lists configurable devices, opens streams of gradient
//! frames, records every request and can be told to deny permission, fail
//! enumeration or drop capabilities.

use crate::compress::encode_jpeg;
use crate::errors::CameraError;
use crate::platform::{CaptureBackend, MediaStream, VideoTrack};
use crate::types::{
    CaptureCapabilities, CaptureConstraints, CapturedFrame, EncodedImage, MediaDeviceInfo,
    TrackSettings, TrackState,
};
use image::DynamicImage;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Create a gradient RGB frame that changes with `frame_number`
pub fn synthetic_video_frame(frame_number: u64, width: u32, height: u32) -> CapturedFrame {
    let mut data = vec![0u8; (width * height * 3) as usize];

    let base = (frame_number % 256) as u8;
    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 3) as usize;
            data[idx] = base.wrapping_add((x % 256) as u8);
            data[idx + 1] = base.wrapping_add((y % 256) as u8);
            data[idx + 2] = base.wrapping_add(((x + y) % 256) as u8);
        }
    }

    CapturedFrame::new(data, width, height, "synthetic".to_string())
}

/// How the synthetic camera behaves
#[derive(Debug, Clone)]
pub struct SyntheticProfile {
    pub devices: Vec<MediaDeviceInfo>,
    /// Resolution streams settle on, regardless of the ideal requested
    pub native_resolution: (u32, u32),
    pub capabilities: CaptureCapabilities,
    /// Resolution of native photos when photo capture is supported
    pub photo_resolution: (u32, u32),
}

impl Default for SyntheticProfile {
    fn default() -> Self {
        Self {
            devices: vec![
                MediaDeviceInfo::video("0", "Synthetic Front Camera"),
                MediaDeviceInfo::video("1", "Synthetic Back Camera"),
            ],
            native_resolution: (640, 480),
            capabilities: CaptureCapabilities {
                frame_grab: true,
                photo_capture: false,
                max_photo_width: 640,
                max_photo_height: 480,
            },
            photo_resolution: (1280, 960),
        }
    }
}

#[derive(Default)]
struct BackendLog {
    requests: Vec<CaptureConstraints>,
    tracks: Vec<Arc<SyntheticTrack>>,
    /// For each successful open: were all earlier tracks already stopped?
    prior_stopped_on_open: Vec<bool>,
}

/// Hardware-free `CaptureBackend`
pub struct SyntheticBackend {
    profile: Mutex<SyntheticProfile>,
    deny_permission: AtomicBool,
    fail_enumeration: AtomicBool,
    fail_captures: Arc<AtomicBool>,
    log: Mutex<BackendLog>,
}

impl SyntheticBackend {
    pub fn new(profile: SyntheticProfile) -> Self {
        Self {
            profile: Mutex::new(profile),
            deny_permission: AtomicBool::new(false),
            fail_enumeration: AtomicBool::new(false),
            fail_captures: Arc::new(AtomicBool::new(false)),
            log: Mutex::new(BackendLog::default()),
        }
    }

    pub fn set_deny_permission(&self, deny: bool) {
        self.deny_permission.store(deny, Ordering::SeqCst);
    }

    pub fn set_fail_enumeration(&self, fail: bool) {
        self.fail_enumeration.store(fail, Ordering::SeqCst);
    }

    /// Make every grab, photo and preview read on every track fail
    pub fn set_fail_captures(&self, fail: bool) {
        self.fail_captures.store(fail, Ordering::SeqCst);
    }

    /// Applies to streams opened afterwards
    pub fn set_capabilities(&self, capabilities: CaptureCapabilities) {
        self.profile().capabilities = capabilities;
    }

    pub fn requests(&self) -> Vec<CaptureConstraints> {
        self.log().requests.clone()
    }

    pub fn opened_tracks(&self) -> Vec<Arc<SyntheticTrack>> {
        self.log().tracks.clone()
    }

    pub fn live_track_count(&self) -> usize {
        self.log()
            .tracks
            .iter()
            .filter(|t| t.state() == TrackState::Live)
            .count()
    }

    pub fn prior_stopped_on_open(&self) -> Vec<bool> {
        self.log().prior_stopped_on_open.clone()
    }

    fn profile(&self) -> std::sync::MutexGuard<'_, SyntheticProfile> {
        self.profile.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn log(&self) -> std::sync::MutexGuard<'_, BackendLog> {
        self.log.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self::new(SyntheticProfile::default())
    }
}

impl CaptureBackend for SyntheticBackend {
    fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, CameraError> {
        if self.fail_enumeration.load(Ordering::SeqCst) {
            return Err(CameraError::EnumerationError(
                "enumeration not supported".to_string(),
            ));
        }
        Ok(self.profile().devices.clone())
    }

    fn get_user_media(&self, constraints: &CaptureConstraints) -> Result<MediaStream, CameraError> {
        self.log().requests.push(constraints.clone());

        if self.deny_permission.load(Ordering::SeqCst) {
            return Err(CameraError::PermissionDenied(
                "NotAllowedError: user denied camera access".to_string(),
            ));
        }

        let profile = self.profile().clone();
        let device = match constraints.device_id.as_deref() {
            Some(id) => profile
                .devices
                .iter()
                .find(|d| d.device_id == id)
                .cloned()
                .ok_or_else(|| CameraError::StreamError(format!("OverconstrainedError: no device {}", id)))?,
            None => profile
                .devices
                .first()
                .cloned()
                .ok_or_else(|| CameraError::StreamError("NotFoundError: no camera".to_string()))?,
        };

        let track = Arc::new(SyntheticTrack {
            id: uuid::Uuid::new_v4().to_string(),
            label: device.label.clone(),
            device_id: device.device_id.clone(),
            resolution: profile.native_resolution,
            photo_resolution: profile.photo_resolution,
            capabilities: profile.capabilities,
            stopped: AtomicBool::new(false),
            frames: AtomicU64::new(0),
            fail_captures: self.fail_captures.clone(),
        });

        let mut log = self.log();
        let all_stopped = log.tracks.iter().all(|t| t.state() == TrackState::Ended);
        log.prior_stopped_on_open.push(all_stopped);
        log.tracks.push(track.clone());

        Ok(MediaStream::new(vec![track as Arc<dyn VideoTrack>]))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

/// Track produced by `SyntheticBackend`
pub struct SyntheticTrack {
    id: String,
    label: String,
    device_id: String,
    resolution: (u32, u32),
    photo_resolution: (u32, u32),
    capabilities: CaptureCapabilities,
    stopped: AtomicBool,
    frames: AtomicU64,
    fail_captures: Arc<AtomicBool>,
}

impl SyntheticTrack {
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn frames_served(&self) -> u64 {
        self.frames.load(Ordering::SeqCst)
    }

    fn next_frame(&self, width: u32, height: u32) -> Result<CapturedFrame, CameraError> {
        if self.state() == TrackState::Ended {
            return Err(CameraError::CaptureError(format!("track {} is stopped", self.id)));
        }
        if self.fail_captures.load(Ordering::SeqCst) {
            return Err(CameraError::CaptureError("InvalidStateError: capture failed".to_string()));
        }
        let n = self.frames.fetch_add(1, Ordering::SeqCst);
        let mut frame = synthetic_video_frame(n, width, height);
        frame.device_id = self.device_id.clone();
        Ok(frame)
    }
}

impl VideoTrack for SyntheticTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn state(&self) -> TrackState {
        if self.stopped.load(Ordering::SeqCst) {
            TrackState::Ended
        } else {
            TrackState::Live
        }
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn settings(&self) -> TrackSettings {
        TrackSettings {
            device_id: self.device_id.clone(),
            width: self.resolution.0,
            height: self.resolution.1,
        }
    }

    fn capabilities(&self) -> CaptureCapabilities {
        self.capabilities
    }

    fn grab_frame(&self) -> Result<CapturedFrame, CameraError> {
        if !self.capabilities.frame_grab {
            return Err(CameraError::Unsupported("grabFrame".to_string()));
        }
        self.next_frame(self.resolution.0, self.resolution.1)
    }

    fn take_photo(&self) -> Result<EncodedImage, CameraError> {
        if !self.capabilities.photo_capture {
            return Err(CameraError::Unsupported("takePhoto".to_string()));
        }
        let (width, height) = self.photo_resolution;
        let frame = self.next_frame(width, height)?;
        let bitmap = frame
            .to_rgb_image()
            .ok_or_else(|| CameraError::CaptureError("bad synthetic frame".to_string()))?;
        let data = encode_jpeg(&DynamicImage::ImageRgb8(bitmap), 95)?;
        Ok(EncodedImage::jpeg(data, 95, width, height))
    }

    fn preview_frame(&self) -> Result<CapturedFrame, CameraError> {
        self.next_frame(self.resolution.0, self.resolution.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_video_frame_correct_size() {
        let frame = synthetic_video_frame(0, 1920, 1080);
        assert_eq!(frame.width, 1920);
        assert_eq!(frame.height, 1080);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_synthetic_video_frames_differ() {
        let frame0 = synthetic_video_frame(0, 320, 240);
        let frame1 = synthetic_video_frame(1, 320, 240);
        assert_ne!(frame0.data[0], frame1.data[0]);
    }

    #[test]
    fn test_unknown_device_is_stream_error() {
        let backend = SyntheticBackend::default();
        let constraints = CaptureConstraints::new(1920, 1080).with_device(Some("missing"));
        assert!(matches!(
            backend.get_user_media(&constraints),
            Err(CameraError::StreamError(_))
        ));
    }

    #[test]
    fn test_frames_served_counts_grabs_and_previews() {
        let backend = SyntheticBackend::default();
        backend.get_user_media(&CaptureConstraints::new(640, 480)).unwrap();
        let track = backend.opened_tracks().remove(0);
        assert_eq!(track.frames_served(), 0);

        track.grab_frame().unwrap();
        track.preview_frame().unwrap();
        assert_eq!(track.frames_served(), 2);

        backend.set_fail_captures(true);
        assert!(track.grab_frame().is_err());
        assert_eq!(track.frames_served(), 2);
    }

    #[test]
    fn test_stopped_track_refuses_frames() {
        let backend = SyntheticBackend::default();
        let stream = backend.get_user_media(&CaptureConstraints::new(640, 480)).unwrap();
        let track = stream.video_track().unwrap();
        assert!(track.grab_frame().is_ok());
        stream.stop_all();
        assert_eq!(track.state(), TrackState::Ended);
        assert!(track.grab_frame().is_err());
    }
}
