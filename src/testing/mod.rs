//! Testing utilities for SnapCam
//!
//! A synthetic capture backend and a presenter that records what it was
//! asked to display.

pub mod recording_presenter;
pub mod synthetic_data;

pub use recording_presenter::{PresenterCall, RecordingPresenter};
pub use synthetic_data::{synthetic_video_frame, SyntheticBackend, SyntheticProfile, SyntheticTrack};
