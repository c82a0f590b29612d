//! Control loop
//!
//! One synchronous iteration per frame: acquire, segment, locate, estimate,
//! steer, actuate. Any frame without a usable target ends in an all-stop.
//! Every exit path goes through [`ControlLoop::shutdown`] exactly once.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use camera_capture::{FrameSource, VideoFrame};
use color_tracker::ColorTracker;
use motor_driver::{ActuatorDriver, MotorIo};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::FollowerConfig;
use crate::steering::SteeringConfig;
use crate::telemetry::{OverlayWriter, Telemetry};
use crate::ControlError;

/// Loop timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Pause after a failed frame read before polling again
    pub retry_delay_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self { retry_delay_ms: 100 }
    }
}

/// Lifecycle of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Init,
    Running,
    ShuttingDown,
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Interrupt signal (Ctrl-C)
    Interrupted,
    /// Explicit quit request
    QuitRequested,
}

const RUNNING: u8 = 0;
const INTERRUPTED: u8 = 1;
const QUIT: u8 = 2;

/// Exit request shared with signal and key-press listeners.
/// Checked once per iteration; the first request wins.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    reason: Arc<AtomicU8>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        self.set(INTERRUPTED);
    }

    pub fn request_quit(&self) {
        self.set(QUIT);
    }

    fn set(&self, reason: u8) {
        let _ = self
            .reason
            .compare_exchange(RUNNING, reason, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// Pending exit, if any
    pub fn exit_reason(&self) -> Option<LoopExit> {
        match self.reason.load(Ordering::SeqCst) {
            INTERRUPTED => Some(LoopExit::Interrupted),
            QUIT => Some(LoopExit::QuitRequested),
            _ => None,
        }
    }
}

/// Frame size fixed by the first frame of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub center_x: u32,
}

impl FrameGeometry {
    pub fn of(frame: &VideoFrame) -> Self {
        Self {
            width: frame.width,
            height: frame.height,
            center_x: frame.width / 2,
        }
    }

    fn matches(&self, frame: &VideoFrame) -> bool {
        frame.width == self.width && frame.height == self.height
    }
}

/// Result of a single iteration
#[derive(Debug, Clone, PartialEq)]
pub enum IterationOutcome {
    /// Target found and wheels commanded
    Tracked(Telemetry),
    /// No target in frame; motors stopped
    NoTarget,
    /// Frame could not be acquired; motors stopped
    FrameDropped,
}

/// Owns the frame source and the actuator for the whole session
pub struct ControlLoop<S: FrameSource, IO: MotorIo> {
    source: S,
    actuator: ActuatorDriver<IO>,
    tracker: ColorTracker,
    steering: SteeringConfig,
    retry_delay: Duration,
    overlay: Option<OverlayWriter>,
    geometry: FrameGeometry,
    state: LoopState,
    iterations: u64,
}

impl<S: FrameSource, IO: MotorIo> ControlLoop<S, IO> {
    /// Read a first frame to fix the session geometry.
    ///
    /// On failure the source and actuator are released before returning.
    pub fn start(
        mut source: S,
        mut actuator: ActuatorDriver<IO>,
        config: &FollowerConfig,
    ) -> Result<Self, ControlError> {
        let first = match source.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to get first frame from {}: {}", source.name(), e);
                source.release();
                if let Err(release_err) = actuator.release() {
                    warn!("Actuator release failed: {}", release_err);
                }
                return Err(ControlError::Init(e));
            }
        };

        let geometry = FrameGeometry::of(&first);
        info!(
            "Camera initialized successfully. Frame size: {}x{}",
            geometry.width, geometry.height
        );

        Ok(Self {
            source,
            actuator,
            tracker: ColorTracker::new(&config.tracker),
            steering: config.steering,
            retry_delay: Duration::from_millis(config.control.retry_delay_ms),
            overlay: OverlayWriter::from_config(&config.overlay),
            geometry,
            state: LoopState::Running,
            iterations: 0,
        })
    }

    /// Run one iteration
    pub fn step(&mut self) -> Result<IterationOutcome, ControlError> {
        if self.state != LoopState::Running {
            return Err(ControlError::ShutDown);
        }
        self.iterations += 1;

        let frame = match self.source.read_frame() {
            Ok(frame) if self.geometry.matches(&frame) => frame,
            Ok(frame) => {
                warn!(
                    "Frame {} is {}x{}, expected {}x{}; dropping",
                    frame.sequence, frame.width, frame.height, self.geometry.width, self.geometry.height
                );
                return self.drop_frame();
            }
            Err(e) => {
                warn!("Failed to get frame, retrying: {}", e);
                return self.drop_frame();
            }
        };

        let detection = self.tracker.detect(
            &frame,
            self.geometry.width,
            self.steering.target_distance_cm,
        );

        let Some(detection) = detection else {
            self.actuator.stop()?;
            debug!("No object detected");
            if let Some(overlay) = self.overlay.as_mut() {
                overlay.record(&frame, None);
            }
            return Ok(IterationOutcome::NoTarget);
        };

        let error = detection.error;
        let command = self.steering.compute(error.bearing_error, error.distance_error);
        let applied = self.actuator.apply(command)?;

        let telemetry = Telemetry {
            sequence: frame.sequence,
            distance_cm: error.distance_cm,
            bearing_error: error.bearing_error,
            command,
            applied,
            region: detection.region,
        };
        telemetry.emit();
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.record(&frame, Some(&telemetry));
        }

        Ok(IterationOutcome::Tracked(telemetry))
    }

    fn drop_frame(&mut self) -> Result<IterationOutcome, ControlError> {
        self.actuator.stop()?;
        if !self.retry_delay.is_zero() {
            std::thread::sleep(self.retry_delay);
        }
        Ok(IterationOutcome::FrameDropped)
    }

    /// Iterate until an exit is requested or a fault occurs, then shut down
    pub fn run(&mut self, signal: &StopSignal) -> Result<LoopExit, ControlError> {
        info!("Control loop running");

        let result = loop {
            if let Some(exit) = signal.exit_reason() {
                info!("Exit requested: {:?}", exit);
                break Ok(exit);
            }
            if let Err(e) = self.step() {
                error!("Control loop fault: {}", e);
                break Err(e);
            }
        };

        let shutdown = self.shutdown();
        match result {
            Ok(exit) => shutdown.map(|()| exit),
            Err(e) => {
                if let Err(shutdown_err) = shutdown {
                    error!("Shutdown after fault failed: {}", shutdown_err);
                }
                Err(e)
            }
        }
    }

    /// Stop the motors and release camera and actuator. Runs once.
    pub fn shutdown(&mut self) -> Result<(), ControlError> {
        if self.state == LoopState::ShuttingDown {
            return Ok(());
        }
        self.state = LoopState::ShuttingDown;
        info!("Shutting down after {} iterations", self.iterations);

        let stopped = self.actuator.stop();
        self.source.release();
        let released = self.actuator.release();

        stopped.and(released).map_err(ControlError::from)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn actuator(&self) -> &ActuatorDriver<IO> {
        &self.actuator
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: FrameSource, IO: MotorIo> Drop for ControlLoop<S, IO> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Shutdown on drop failed: {}", e);
        }
    }
}
