//! Camera Capture Library for the Color Follower
//!
//! Provides the frame acquisition contract used by the control loop.
//! Supports:
//! - Snapshot files continuously rewritten by an external grabber
//! - Replay of recorded frame directories
//! - Scripted sources for tests and dry runs

pub mod frame;
pub mod mock;
pub mod source;

pub use frame::VideoFrame;
pub use mock::ScriptedSource;
pub use source::{open_first_available, FrameSource, SequenceSource, SnapshotSource};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera: {0}")]
    Open(String),

    #[error("No camera found. Tried: {0}")]
    NoDevice(String),

    #[error("Frame decode failed: {0}")]
    Decode(String),

    #[error("Frame read failed: {0}")]
    Read(String),

    #[error("Frame sequence exhausted")]
    Exhausted,

    #[error("Camera released")]
    Released,
}

impl From<image::ImageError> for CameraError {
    fn from(err: image::ImageError) -> Self {
        CameraError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        CameraError::Read(err.to_string())
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Candidate devices, tried in order. A directory replays recorded
    /// frames, a file is polled as a live snapshot.
    pub devices: Vec<PathBuf>,
    /// Restart a replayed directory once it runs out
    pub repeat_sequence: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            devices: (0..3)
                .map(|index| PathBuf::from(format!("/dev/shm/color-follower/video{index}.jpg")))
                .collect(),
            repeat_sequence: true,
        }
    }
}

impl CameraConfig {
    /// Config that replays a recorded directory
    pub fn replay(dir: impl Into<PathBuf>) -> Self {
        Self {
            devices: vec![dir.into()],
            repeat_sequence: false,
        }
    }
}
