//! Layered configuration: defaults, optional TOML file, `FOLLOWER__*` environment

use std::path::Path;

use camera_capture::CameraConfig;
use color_tracker::TrackerConfig;
use motor_driver::{DriverConfig, SysfsConfig};
use serde::{Deserialize, Serialize};

use crate::control::LoopConfig;
use crate::logging::LoggingConfig;
use crate::steering::SteeringConfig;
use crate::telemetry::OverlayConfig;
use crate::ControlError;

/// Default configuration file, read when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "color-follower.toml";

/// Environment variable prefix; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "FOLLOWER";

/// Motor backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorsConfig {
    /// Record commands instead of touching GPIO
    pub dry_run: bool,
    pub sysfs: SysfsConfig,
}

/// Complete follower configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerConfig {
    pub camera: CameraConfig,
    pub tracker: TrackerConfig,
    pub steering: SteeringConfig,
    pub driver: DriverConfig,
    pub motors: MotorsConfig,
    pub control: LoopConfig,
    pub overlay: OverlayConfig,
    pub logging: LoggingConfig,
}

impl FollowerConfig {
    /// Load defaults, then the file at `path` if it exists, then environment overrides
    pub fn load(path: &Path) -> Result<Self, ControlError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
