//! One follower session: open camera, then motors, then run the loop

use anyhow::Context;
use camera_capture::{open_first_available, FrameSource};
use motor_driver::{ActuatorDriver, MockMotorIo, MotorIo, SysfsMotorIo};
use tracing::{error, info};

use crate::config::FollowerConfig;
use crate::control::{ControlLoop, LoopExit, StopSignal};

/// Process exit status for a clean stop
pub const EXIT_CLEAN: u8 = 0;
/// Process exit status for a fatal startup failure or runtime fault
pub const EXIT_FATAL: u8 = 1;

/// Run until the signal fires or a fatal error occurs.
///
/// The camera is opened first; without one the motors are never touched.
pub fn run_session(config: &FollowerConfig, signal: &StopSignal) -> anyhow::Result<LoopExit> {
    let source = open_first_available(&config.camera).context("Camera initialization failed")?;
    info!("Using frame source {}", source.name());

    if config.motors.dry_run {
        info!("Dry run: motor commands are recorded, not applied");
        follow(source, MockMotorIo::new(), config, signal)
    } else {
        let io = SysfsMotorIo::open(config.motors.sysfs.clone())
            .context("Failed to open motor outputs")?;
        follow(source, io, config, signal)
    }
}

fn follow<IO: MotorIo>(
    source: Box<dyn FrameSource>,
    io: IO,
    config: &FollowerConfig,
    signal: &StopSignal,
) -> anyhow::Result<LoopExit> {
    let actuator = ActuatorDriver::new(io, config.driver).context("Failed to reset actuator")?;
    let mut control = ControlLoop::start(source, actuator, config)?;
    let exit = control.run(signal).context("Control loop terminated")?;
    Ok(exit)
}

/// Map a session result to the process exit status
pub fn exit_status(result: &anyhow::Result<LoopExit>) -> u8 {
    match result {
        Ok(exit) => {
            info!("Follower stopped cleanly ({:?})", exit);
            EXIT_CLEAN
        }
        Err(e) => {
            error!("{:#}", e);
            EXIT_FATAL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_capture::{CameraConfig, CameraError, VideoFrame};

    fn dry_run_config(camera: CameraConfig) -> FollowerConfig {
        let mut config = FollowerConfig::default();
        config.camera = camera;
        config.motors.dry_run = true;
        config.control.retry_delay_ms = 0;
        config
    }

    #[test]
    fn test_no_camera_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = dry_run_config(CameraConfig {
            devices: vec![dir.path().join("video0.jpg"), dir.path().join("video1.jpg")],
            repeat_sequence: true,
        });

        let result = run_session(&config, &StopSignal::new());
        let err = result.as_ref().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CameraError>(),
            Some(CameraError::NoDevice(_))
        ));
        assert_eq!(exit_status(&result), EXIT_FATAL);
    }

    #[test]
    fn test_quit_exits_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let frame_path = dir.path().join("video0.png");
        VideoFrame::solid(32, 24, [0, 0, 0])
            .to_image()
            .unwrap()
            .save(&frame_path)
            .unwrap();
        let config = dry_run_config(CameraConfig {
            devices: vec![frame_path],
            repeat_sequence: true,
        });

        let signal = StopSignal::new();
        signal.request_quit();
        let result = run_session(&config, &signal);
        assert_eq!(result.as_ref().unwrap(), &LoopExit::QuitRequested);
        assert_eq!(exit_status(&result), EXIT_CLEAN);
    }

    #[test]
    fn test_interrupt_exits_cleanly() {
        let signal = StopSignal::new();
        signal.interrupt();
        let result: anyhow::Result<LoopExit> = Ok(signal.exit_reason().unwrap());
        assert_eq!(exit_status(&result), EXIT_CLEAN);
    }
}
