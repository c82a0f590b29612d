//! Actuator I/O contract

use crate::{Direction, MotorError, Wheel};

/// Raw access to the H-bridge: two direction pins and one PWM channel per wheel.
pub trait MotorIo: Send {
    /// Drive the direction pin pair of one wheel
    fn set_direction(&mut self, wheel: Wheel, direction: Direction) -> Result<(), MotorError>;

    /// Set the duty cycle of one wheel, in percent
    fn set_duty_cycle(&mut self, wheel: Wheel, duty: f64) -> Result<(), MotorError>;

    /// All pins low, all channels at 0. Idempotent.
    fn reset(&mut self) -> Result<(), MotorError>;

    /// Hand the pins and channels back to the system
    fn release(&mut self) -> Result<(), MotorError>;
}
