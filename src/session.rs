//! The active capture session and the stream manager that owns it.

use crate::config::StreamConfig;
use crate::errors::CameraError;
use crate::platform::{CaptureBackend, MediaStream, VideoTrack};
use crate::types::{
    CaptureCapabilities, CaptureConstraints, Platform, TrackSettings, TrackState,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Open,
    Active,
    Closed,
}

/// One open stream plus everything resolved about it at open time
pub struct CaptureSession {
    stream: MediaStream,
    track: Arc<dyn VideoTrack>,
    capabilities: CaptureCapabilities,
    constraints: CaptureConstraints,
    state: Mutex<SessionState>,
    opened_at: DateTime<Utc>,
}

/// Serializable snapshot of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub stream_id: String,
    pub track_id: String,
    pub label: String,
    pub settings: TrackSettings,
    pub capabilities: CaptureCapabilities,
    pub constraints: CaptureConstraints,
    pub state: SessionState,
    pub opened_at: DateTime<Utc>,
}

impl CaptureSession {
    /// Wrap a freshly opened stream. Fails if it carries no video track.
    pub fn new(stream: MediaStream, constraints: CaptureConstraints) -> Result<Self, CameraError> {
        let track = stream.video_track().ok_or_else(|| {
            CameraError::StreamError(format!("stream {} has no video track", stream.id()))
        })?;
        let capabilities = track.capabilities();

        Ok(Self {
            stream,
            track,
            capabilities,
            constraints,
            state: Mutex::new(SessionState::Open),
            opened_at: Utc::now(),
        })
    }

    pub fn track(&self) -> Arc<dyn VideoTrack> {
        self.track.clone()
    }

    pub fn capabilities(&self) -> CaptureCapabilities {
        self.capabilities
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn set_state(&self, state: SessionState) {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = state;
    }

    fn activate(&self) {
        self.set_state(SessionState::Active);
    }

    /// Stop every track and mark the session closed. Safe to call repeatedly.
    pub fn release(&self) {
        self.stream.stop_all();
        self.set_state(SessionState::Closed);
    }

    pub fn is_live(&self) -> bool {
        self.state() == SessionState::Active && self.track.state() == TrackState::Live
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            stream_id: self.stream.id().to_string(),
            track_id: self.track.id().to_string(),
            label: self.track.label().to_string(),
            settings: self.track.settings(),
            capabilities: self.capabilities,
            constraints: self.constraints.clone(),
            state: self.state(),
            opened_at: self.opened_at,
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if self.state() != SessionState::Closed {
            self.release();
        }
    }
}

/// Build stream constraints for `source_id` on `platform`
pub fn build_constraints(
    source_id: Option<&str>,
    platform: Platform,
    config: &StreamConfig,
) -> CaptureConstraints {
    if platform.is_mobile() {
        let [width, height] = config.mobile_resolution;
        CaptureConstraints::new(width, height)
            .with_device(source_id)
            .with_facing_mode(config.mobile_facing_mode)
    } else {
        let [width, height] = config.desktop_resolution;
        CaptureConstraints::new(width, height).with_device(source_id)
    }
}

/// Sole owner and writer of the active session slot
pub struct StreamManager {
    backend: Arc<dyn CaptureBackend>,
    platform: Platform,
    slot: RwLock<Option<Arc<CaptureSession>>>,
}

impl StreamManager {
    pub fn new(backend: Arc<dyn CaptureBackend>, platform: Platform) -> Self {
        Self {
            backend,
            platform,
            slot: RwLock::new(None),
        }
    }

    pub fn backend(&self) -> Arc<dyn CaptureBackend> {
        self.backend.clone()
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The active session, if any. Empty while a switch is in flight.
    pub async fn current(&self) -> Option<Arc<CaptureSession>> {
        self.slot.read().await.clone()
    }

    /// Release the current session (if any) then open a new one.
    ///
    /// The slot stays empty between the release and a successful open; on
    /// failure it stays empty.
    pub async fn open(
        &self,
        source_id: Option<&str>,
        config: &StreamConfig,
    ) -> Result<Arc<CaptureSession>, CameraError> {
        self.close().await;

        let constraints = build_constraints(source_id, self.platform, config);
        log::info!(
            "Requesting stream: device={:?} ideal={}x{} facing={:?}",
            constraints.device_id,
            constraints.ideal_width,
            constraints.ideal_height,
            constraints.facing_mode
        );

        let backend = self.backend.clone();
        let session = tokio::task::spawn_blocking(move || {
            let stream = backend.get_user_media(&constraints)?;
            match CaptureSession::new(stream.clone(), constraints) {
                Ok(session) => Ok(session),
                Err(e) => {
                    stream.stop_all();
                    Err(e)
                }
            }
        })
        .await
        .map_err(|e| CameraError::StreamError(format!("Task join error: {}", e)))??;

        session.activate();
        let session = Arc::new(session);

        let mut slot = self.slot.write().await;
        if let Some(racing) = slot.replace(session.clone()) {
            // Another open finished first; only one session may stay active
            log::warn!("Replacing session {} opened concurrently", racing.info().stream_id);
            release_blocking(racing).await;
        }
        drop(slot);

        Ok(session)
    }

    /// Release the active session. Returns whether one was active.
    pub async fn close(&self) -> bool {
        let previous = self.slot.write().await.take();
        match previous {
            Some(session) => {
                log::info!("Releasing stream {}", session.info().stream_id);
                release_blocking(session).await;
                true
            }
            None => false,
        }
    }
}

async fn release_blocking(session: Arc<CaptureSession>) {
    if let Err(e) = tokio::task::spawn_blocking(move || session.release()).await {
        log::error!("Failed to release stream: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SnapCamConfig;
    use crate::types::FacingMode;

    #[test]
    fn test_desktop_constraints() {
        let config = SnapCamConfig::default().stream;
        let c = build_constraints(Some("2"), Platform::Linux, &config);
        assert_eq!(c.device_id.as_deref(), Some("2"));
        assert_eq!((c.ideal_width, c.ideal_height), (1920, 1080));
        assert_eq!(c.facing_mode, None);
    }

    #[test]
    fn test_mobile_constraints() {
        let config = SnapCamConfig::default().stream;
        let c = build_constraints(None, Platform::Ios, &config);
        assert_eq!(c.device_id, None);
        assert_eq!((c.ideal_width, c.ideal_height), (1280, 720));
        assert_eq!(c.facing_mode, Some(FacingMode::User));
    }
}
