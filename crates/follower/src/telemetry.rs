//! Per-iteration telemetry and debug overlay output

use std::fmt;
use std::path::PathBuf;

use camera_capture::VideoFrame;
use color_tracker::{write_overlay, BoundingRegion};
use motor_driver::WheelCommand;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One tracked iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Telemetry {
    pub sequence: u32,
    pub distance_cm: f64,
    pub bearing_error: f64,
    /// Output of the steering law
    pub command: WheelCommand,
    /// Duty cycles written after shaping
    pub applied: WheelCommand,
    pub region: BoundingRegion,
}

impl Telemetry {
    /// Log the telemetry line with structured fields
    pub fn emit(&self) {
        info!(
            sequence = self.sequence,
            distance_cm = self.distance_cm,
            bearing_error = self.bearing_error,
            left = self.command.left,
            right = self.command.right,
            "{}",
            self
        );
    }
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Distance: {:.1}cm, Center Error: {:.2}, Left: {:.1}, Right: {:.1}",
            self.distance_cm, self.bearing_error, self.command.left, self.command.right
        )
    }
}

/// Debug overlay output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Image written with the box and centerline; disabled when unset
    pub path: Option<PathBuf>,
    /// Write one overlay every N iterations (0 behaves like 1)
    pub every_n_frames: u32,
}

/// Writes the overlay image plus a JSON sidecar with the numeric readouts
pub struct OverlayWriter {
    path: PathBuf,
    every_n: u64,
    counter: u64,
}

impl OverlayWriter {
    /// `None` when no overlay path is configured
    pub fn from_config(config: &OverlayConfig) -> Option<Self> {
        config.path.as_ref().map(|path| Self {
            path: path.clone(),
            every_n: config.every_n_frames.max(1) as u64,
            counter: 0,
        })
    }

    /// Path of the JSON readout written next to the image
    pub fn sidecar_path(&self) -> PathBuf {
        self.path.with_extension("json")
    }

    /// Write the overlay if this iteration is due. Failures are logged only.
    pub fn record(&mut self, frame: &VideoFrame, telemetry: Option<&Telemetry>) {
        self.counter += 1;
        if (self.counter - 1) % self.every_n != 0 {
            return;
        }

        let region = telemetry.map(|t| &t.region);
        if let Err(e) = write_overlay(frame, region, &self.path) {
            warn!("Failed to write overlay {}: {}", self.path.display(), e);
            return;
        }

        let readout = serde_json::json!({
            "sequence": frame.sequence,
            "target": telemetry,
        });
        if let Err(e) = std::fs::write(self.sidecar_path(), readout.to_string()) {
            warn!("Failed to write overlay readout: {}", e);
            return;
        }
        debug!("Overlay written for frame {}", frame.sequence);
    }
}
