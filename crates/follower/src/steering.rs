//! Steering and speed law
//!
//! Piecewise-constant reactive law, evaluated in priority order:
//! 1. Closer than the stop distance: stop.
//! 2. Bearing outside the dead-zone: throttle the wheel on the target's side.
//! 3. Otherwise: straight pursuit at base speed.
//!
//! The inner wheel always runs at a fixed fraction of base speed; there is
//! no proportional term.

use motor_driver::WheelCommand;
use serde::{Deserialize, Serialize};

/// Steering law constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Desired standoff distance (cm)
    pub target_distance_cm: f64,
    /// At or below this distance both wheels stop (cm)
    pub stop_distance_cm: f64,
    /// Outer-wheel and straight-line speed
    pub base_speed: f64,
    /// Bearing band with no turning correction
    pub dead_zone: f64,
    /// Inner-wheel speed as a fraction of base speed
    pub turn_factor: f64,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            target_distance_cm: 50.0,
            stop_distance_cm: 45.0,
            base_speed: 60.0,
            dead_zone: 0.1,
            turn_factor: 0.3,
        }
    }
}

impl SteeringConfig {
    /// Wheel speeds for a bearing error and a signed distance error
    pub fn compute(&self, bearing_error: f64, distance_error: f64) -> WheelCommand {
        let current_distance = distance_error + self.target_distance_cm;
        if current_distance <= self.stop_distance_cm {
            return WheelCommand::STOP;
        }

        let inner = self.base_speed * self.turn_factor;
        if bearing_error.abs() > self.dead_zone {
            if bearing_error < 0.0 {
                // Target on the left
                WheelCommand::new(self.base_speed, inner)
            } else {
                WheelCommand::new(inner, self.base_speed)
            }
        } else {
            WheelCommand::new(self.base_speed, self.base_speed)
        }
    }
}
