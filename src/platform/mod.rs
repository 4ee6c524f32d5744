//! Platform capture API
//!
//! `CaptureBackend` and `VideoTrack` model what the host platform offers:
//! device enumeration, stream acquisition under constraints, per-track stop,
//! frame grab, photo capture and capability queries. All calls are blocking;
//! the controller runs them on the blocking thread pool.

pub mod native;

use crate::errors::CameraError;
use crate::types::{
    CaptureCapabilities, CaptureConstraints, CapturedFrame, EncodedImage, MediaDeviceInfo,
    TrackSettings, TrackState,
};
use std::sync::Arc;

pub use native::NativeBackend;

/// Entry point into the platform's camera stack
pub trait CaptureBackend: Send + Sync {
    /// List every media device the platform reports, video or not
    fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, CameraError>;

    /// Open a new stream satisfying `constraints` as closely as possible
    fn get_user_media(&self, constraints: &CaptureConstraints) -> Result<MediaStream, CameraError>;

    /// Short backend name for logs and diagnostics
    fn name(&self) -> &str;
}

/// A single video channel of an open stream
pub trait VideoTrack: Send + Sync {
    fn id(&self) -> &str;

    fn label(&self) -> &str;

    fn state(&self) -> TrackState;

    /// Release the underlying device. Stopping an ended track is a no-op.
    fn stop(&self);

    fn settings(&self) -> TrackSettings;

    fn capabilities(&self) -> CaptureCapabilities;

    /// Pull one bitmap from the live track
    fn grab_frame(&self) -> Result<CapturedFrame, CameraError>;

    /// Take a full-resolution encoded photo through the platform's still-capture path
    fn take_photo(&self) -> Result<EncodedImage, CameraError> {
        Err(CameraError::Unsupported(format!(
            "track {} has no still-capture path",
            self.id()
        )))
    }

    /// Current frame of the live preview at the track's native resolution
    fn preview_frame(&self) -> Result<CapturedFrame, CameraError> {
        self.grab_frame()
    }
}

/// An open capture stream and its tracks
#[derive(Clone)]
pub struct MediaStream {
    id: String,
    tracks: Vec<Arc<dyn VideoTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Arc<dyn VideoTrack>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tracks,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tracks(&self) -> &[Arc<dyn VideoTrack>] {
        &self.tracks
    }

    pub fn video_track(&self) -> Option<Arc<dyn VideoTrack>> {
        self.tracks.first().cloned()
    }

    /// Stop every track on the stream
    pub fn stop_all(&self) {
        for track in &self.tracks {
            if track.state() == TrackState::Live {
                log::debug!("Stopping track {} ({})", track.id(), track.label());
            }
            track.stop();
        }
    }

    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(|t| t.state() == TrackState::Live)
    }
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("tracks", &self.tracks.iter().map(|t| t.id()).collect::<Vec<_>>())
            .finish()
    }
}
