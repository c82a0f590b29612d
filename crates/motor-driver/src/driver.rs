//! Actuator driver: command shaping and fail-safe stop

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{Direction, MotorError, MotorIo, Wheel, WheelCommand};

/// Duty-cycle limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Smallest duty that overcomes static friction
    pub min_threshold: f64,
    /// Saturation limit
    pub max_duty: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            min_threshold: 40.0,
            max_duty: 100.0,
        }
    }
}

/// Clamp a requested speed to something the hardware may safely receive.
///
/// Negative and NaN become 0; a positive speed below the floor is raised
/// to the floor; anything above the limit is saturated. 0 stays 0.
pub fn shape_speed(speed: f64, config: &DriverConfig) -> f64 {
    let speed = if speed.is_nan() { 0.0 } else { speed.max(0.0) };
    let speed = if speed > 0.0 && speed < config.min_threshold {
        config.min_threshold
    } else {
        speed
    };
    speed.min(config.max_duty)
}

/// Last state written to one wheel
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ChannelState {
    pub direction: Direction,
    pub duty: f64,
}

/// Last state written to both wheels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ActuatorState {
    pub left: ChannelState,
    pub right: ChannelState,
}

impl ActuatorState {
    pub fn is_stopped(&self) -> bool {
        *self == Self::default()
    }

    fn channel_mut(&mut self, wheel: Wheel) -> &mut ChannelState {
        match wheel {
            Wheel::Left => &mut self.left,
            Wheel::Right => &mut self.right,
        }
    }
}

/// Owns the motor backend for the lifetime of the process.
///
/// Dropping the driver stops the motors and releases the backend if
/// [`ActuatorDriver::release`] was not called.
pub struct ActuatorDriver<IO: MotorIo> {
    io: IO,
    config: DriverConfig,
    state: ActuatorState,
    released: bool,
}

impl<IO: MotorIo> ActuatorDriver<IO> {
    /// Take ownership of the backend and reset it
    pub fn new(mut io: IO, config: DriverConfig) -> Result<Self, MotorError> {
        io.reset()?;
        info!(
            "Actuator driver ready (floor {}, limit {})",
            config.min_threshold, config.max_duty
        );
        Ok(Self {
            io,
            config,
            state: ActuatorState::default(),
            released: false,
        })
    }

    /// Shape and apply a command, driving both wheels forward.
    /// Returns the duty cycles actually written.
    pub fn apply(&mut self, command: WheelCommand) -> Result<WheelCommand, MotorError> {
        let applied = WheelCommand::new(
            shape_speed(command.left, &self.config),
            shape_speed(command.right, &self.config),
        );
        if applied != command {
            debug!("Command {:?} shaped to {:?}", command, applied);
        }

        for (wheel, duty) in [(Wheel::Left, applied.left), (Wheel::Right, applied.right)] {
            self.io.set_direction(wheel, Direction::Forward)?;
            self.state.channel_mut(wheel).direction = Direction::Forward;
            self.io.set_duty_cycle(wheel, duty)?;
            self.state.channel_mut(wheel).duty = duty;
        }

        Ok(applied)
    }

    /// Zero both channels and pull every direction pin low.
    ///
    /// Every write is attempted even if an earlier one fails; the first
    /// error is returned. A no-op once the driver is released.
    pub fn stop(&mut self) -> Result<(), MotorError> {
        if self.released {
            return Ok(());
        }

        let mut first_error = None;
        for wheel in Wheel::BOTH {
            match self.io.set_duty_cycle(wheel, 0.0) {
                Ok(()) => self.state.channel_mut(wheel).duty = 0.0,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
            match self.io.set_direction(wheel, Direction::Off) {
                Ok(()) => self.state.channel_mut(wheel).direction = Direction::Off,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Stop, reset and release the backend. Runs once; later calls are no-ops.
    pub fn release(&mut self) -> Result<(), MotorError> {
        if self.released {
            return Ok(());
        }

        let stopped = self.stop();
        if let Err(e) = &stopped {
            warn!("Stop before release failed: {}", e);
        }
        let reset = self.io.reset();
        if reset.is_ok() {
            self.state = ActuatorState::default();
        }
        let released = self.io.release();
        self.released = true;

        info!("Actuator released");
        stopped.and(reset).and(released)
    }

    /// Last state written to the hardware
    pub fn state(&self) -> ActuatorState {
        self.state
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Access the backend
    pub fn io(&self) -> &IO {
        &self.io
    }
}

impl<IO: MotorIo> Drop for ActuatorDriver<IO> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Actuator release on drop failed: {}", e);
        }
    }
}
