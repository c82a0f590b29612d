//! Recording actuator backend for dry runs and tests

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::{Direction, MotorError, MotorIo, Wheel};

/// One recorded I/O operation
#[derive(Debug, Clone, PartialEq)]
pub enum IoEvent {
    Direction(Wheel, Direction),
    Duty(Wheel, f64),
    Reset,
    Release,
}

/// Observable state of the mock hardware
#[derive(Debug, Clone, Default)]
pub struct MockState {
    pub directions: [Direction; 2],
    pub duty: [f64; 2],
    pub resets: usize,
    pub releases: usize,
    pub events: Vec<IoEvent>,
    /// When set, every duty-cycle write fails
    pub fail_duty_writes: bool,
}

impl MockState {
    /// Both channels at zero and all pins low
    pub fn is_stopped(&self) -> bool {
        self.duty == [0.0, 0.0] && self.directions == [Direction::Off, Direction::Off]
    }
}

/// Mock H-bridge. Clones share the same recorded state, so a test can keep
/// a handle after moving the backend into a driver.
#[derive(Debug, Clone, Default)]
pub struct MockMotorIo {
    state: Arc<Mutex<MockState>>,
}

impl MockMotorIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock and inspect the recorded state
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock only means a test thread panicked mid-record.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the recorded state
    pub fn snapshot(&self) -> MockState {
        self.state().clone()
    }

    /// Make subsequent duty-cycle writes fail
    pub fn inject_duty_fault(&self, fail: bool) {
        self.state().fail_duty_writes = fail;
    }
}

impl MotorIo for MockMotorIo {
    fn set_direction(&mut self, wheel: Wheel, direction: Direction) -> Result<(), MotorError> {
        let mut state = self.state();
        state.directions[wheel.index()] = direction;
        state.events.push(IoEvent::Direction(wheel, direction));
        Ok(())
    }

    fn set_duty_cycle(&mut self, wheel: Wheel, duty: f64) -> Result<(), MotorError> {
        let mut state = self.state();
        if state.fail_duty_writes {
            return Err(MotorError::Injected(format!("{:?} duty write", wheel)));
        }
        state.duty[wheel.index()] = duty;
        state.events.push(IoEvent::Duty(wheel, duty));
        Ok(())
    }

    fn reset(&mut self) -> Result<(), MotorError> {
        let mut state = self.state();
        state.directions = [Direction::Off; 2];
        state.duty = [0.0; 2];
        state.resets += 1;
        state.events.push(IoEvent::Reset);
        Ok(())
    }

    fn release(&mut self) -> Result<(), MotorError> {
        debug!("Mock motor backend released");
        let mut state = self.state();
        state.releases += 1;
        state.events.push(IoEvent::Release);
        Ok(())
    }
}
