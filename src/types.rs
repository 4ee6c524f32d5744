//! Core data types shared by the capture backend, controller and presenters.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform enumeration for camera backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    MacOS,
    Linux,
    Android,
    Ios,
    Unknown,
}

impl Platform {
    /// Detect the current platform
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOS => "macos",
            Platform::Linux => "linux",
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Unknown => "unknown",
        }
    }

    /// Phones and tablets get the reduced capture profile
    pub fn is_mobile(&self) -> bool {
        matches!(self, Platform::Android | Platform::Ios)
    }
}

/// Kind of media device reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

/// Raw device record as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDeviceInfo {
    pub device_id: String,
    /// Often empty until camera permission has been granted
    pub label: String,
    pub kind: DeviceKind,
}

impl MediaDeviceInfo {
    pub fn new(device_id: impl Into<String>, label: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            device_id: device_id.into(),
            label: label.into(),
            kind,
        }
    }

    pub fn video(device_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(device_id, label, DeviceKind::VideoInput)
    }
}

/// Entry in the source selection list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub device_id: String,
    pub label: String,
}

/// Which way a camera points, as a hint when opening a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    User,
    Environment,
}

/// Parameters used to request a stream. Built fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConstraints {
    /// Exact device to open; `None` lets the platform choose
    pub device_id: Option<String>,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing_mode: Option<FacingMode>,
}

impl CaptureConstraints {
    pub fn new(ideal_width: u32, ideal_height: u32) -> Self {
        Self {
            device_id: None,
            ideal_width,
            ideal_height,
            facing_mode: None,
        }
    }

    pub fn with_device(mut self, device_id: Option<&str>) -> Self {
        self.device_id = device_id.filter(|id| !id.is_empty()).map(str::to_string);
        self
    }

    pub fn with_facing_mode(mut self, facing_mode: FacingMode) -> Self {
        self.facing_mode = Some(facing_mode);
        self
    }
}

/// What the active track can do, resolved once when the stream opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureCapabilities {
    pub frame_grab: bool,
    pub photo_capture: bool,
    pub max_photo_width: u32,
    pub max_photo_height: u32,
}

impl Default for CaptureCapabilities {
    fn default() -> Self {
        Self {
            frame_grab: true,
            photo_capture: false,
            max_photo_width: 0,
            max_photo_height: 0,
        }
    }
}

/// Lifecycle state of a single media track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackState {
    Live,
    Ended,
}

/// Settings the platform actually applied to a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSettings {
    pub device_id: String,
    pub width: u32,
    pub height: u32,
}

/// A raw RGB8 bitmap grabbed from a live track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
}

impl CapturedFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, device_id: String) -> Self {
        Self {
            data,
            width,
            height,
            device_id,
            timestamp: Utc::now(),
        }
    }

    /// Frame data must hold exactly width * height RGB triples
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == (self.width as usize) * (self.height as usize) * 3
    }

    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.data.clone())
    }
}

/// An encoded still image (the "blob")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: Bytes,
    pub mime_type: String,
    /// Encoder quality 1-100 when known
    pub quality: Option<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn jpeg(data: Bytes, quality: u8, width: u32, height: u32) -> Self {
        Self {
            data,
            mime_type: "image/jpeg".to_string(),
            quality: Some(quality),
            width,
            height,
        }
    }

    pub fn png(data: Bytes, width: u32, height: u32) -> Self {
        Self {
            data,
            mime_type: "image/png".to_string(),
            quality: None,
            width,
            height,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            _ => "jpg",
        }
    }
}

/// Display surface dimensions in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Keep the full width, limit height to `fraction` of it
    pub fn scaled_height(self, fraction: f64) -> Self {
        Self {
            width: self.width,
            height: self.height * fraction,
        }
    }
}

/// Computed on-screen size for a captured image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayGeometry {
    pub width: f64,
    pub height: f64,
}

impl DisplayGeometry {
    /// Whole-pixel size, never below 1x1
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width.round() as u32).max(1),
            (self.height.round() as u32).max(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraints_ignore_empty_device_id() {
        let c = CaptureConstraints::new(1920, 1080).with_device(Some(""));
        assert_eq!(c.device_id, None);
        let c = CaptureConstraints::new(1920, 1080).with_device(Some("cam-1"));
        assert_eq!(c.device_id.as_deref(), Some("cam-1"));
    }

    #[test]
    fn test_frame_validity() {
        let frame = CapturedFrame::new(vec![0; 4 * 2 * 3], 4, 2, "d".to_string());
        assert!(frame.is_valid());
        let short = CapturedFrame::new(vec![0; 5], 4, 2, "d".to_string());
        assert!(!short.is_valid());
        assert!(short.to_rgb_image().is_none());
    }

    #[test]
    fn test_viewport_scaling() {
        let v = Viewport::new(1000.0, 1000.0).scaled_height(0.6);
        assert_eq!(v.width, 1000.0);
        assert!((v.height - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_size_rounds_and_clamps() {
        let g = DisplayGeometry { width: 1000.0, height: 562.5 };
        assert_eq!(g.pixel_size(), (1000, 563));
        let tiny = DisplayGeometry { width: 0.2, height: 0.1 };
        assert_eq!(tiny.pixel_size(), (1, 1));
    }

    #[test]
    fn test_platform_mobile_class() {
        assert!(Platform::Android.is_mobile());
        assert!(Platform::Ios.is_mobile());
        assert!(!Platform::Linux.is_mobile());
    }
}
