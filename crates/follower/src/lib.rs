//! Color Follower
//!
//! Closed-loop follower for a two-wheel differential-drive robot. Each
//! camera frame is segmented for the target color, the target's bounding
//! region gives a bearing and a range, and a reactive steering law drives
//! the wheels toward a standoff distance.

pub mod cli;
pub mod config;
pub mod control;
pub mod logging;
pub mod session;
pub mod steering;
pub mod telemetry;

pub use cli::Cli;
pub use config::{FollowerConfig, MotorsConfig, DEFAULT_CONFIG_PATH, ENV_PREFIX};
pub use control::{
    ControlLoop, FrameGeometry, IterationOutcome, LoopConfig, LoopExit, LoopState, StopSignal,
};
pub use logging::{init_logging, LoggingConfig};
pub use session::{exit_status, run_session, EXIT_CLEAN, EXIT_FATAL};
pub use steering::SteeringConfig;
pub use telemetry::{OverlayConfig, OverlayWriter, Telemetry};

use camera_capture::CameraError;
use motor_driver::MotorError;
use thiserror::Error;

/// Control loop error types
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Failed to get first frame: {0}")]
    Init(CameraError),

    #[error("Actuator fault: {0}")]
    Motor(#[from] MotorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Control loop already shut down")]
    ShutDown,
}
