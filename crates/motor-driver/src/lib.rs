//! Differential Drive Motor Driver
//!
//! Drives two independently powered wheels through an H-bridge:
//! - Two direction pins per wheel
//! - One PWM duty-cycle channel per wheel (0-100)
//! - Minimum-power floor and saturation clamp on every command
//! - Fail-safe all-stop

pub mod driver;
pub mod io;
pub mod mock;
pub mod sysfs;

pub use driver::{shape_speed, ActuatorDriver, ActuatorState, ChannelState, DriverConfig};
pub use io::MotorIo;
pub use mock::{IoEvent, MockMotorIo};
pub use sysfs::{MotorPins, SysfsConfig, SysfsMotorIo};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Motor error types
#[derive(Error, Debug)]
pub enum MotorError {
    #[error("Failed to write {path}: {source}")]
    Sysfs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("GPIO {0} could not be exported")]
    GpioUnavailable(u32),

    #[error("PWM channel {channel} on chip {chip} could not be exported")]
    PwmUnavailable { chip: u32, channel: u32 },

    #[error("Invalid PWM frequency: {0} Hz")]
    InvalidFrequency(u32),

    #[error("Injected fault: {0}")]
    Injected(String),
}

/// Wheel selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wheel {
    Left,
    Right,
}

impl Wheel {
    pub const BOTH: [Wheel; 2] = [Wheel::Left, Wheel::Right];

    pub fn index(self) -> usize {
        match self {
            Wheel::Left => 0,
            Wheel::Right => 1,
        }
    }
}

/// H-bridge direction pin state for one wheel. The drive is forward-only,
/// so in2 is never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Both pins low
    #[default]
    Off,
    /// in1 high, in2 low
    Forward,
}

impl Direction {
    /// Logic levels for (in1, in2)
    pub fn pin_levels(self) -> (bool, bool) {
        match self {
            Direction::Off => (false, false),
            Direction::Forward => (true, false),
        }
    }
}

/// Requested wheel speeds, nominally in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelCommand {
    pub left: f64,
    pub right: f64,
}

impl WheelCommand {
    pub const STOP: WheelCommand = WheelCommand { left: 0.0, right: 0.0 };

    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn is_stop(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}
