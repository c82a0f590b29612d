//! Color Target Tracking
//!
//! Single-target localization by color:
//! - HSV hue-band segmentation
//! - Bounding region of in-band pixels
//! - Monocular range estimate from apparent width
//! - Bearing error relative to the frame centerline
//! - Debug overlay rendering

pub mod config;
pub mod distance;
pub mod hsv;
pub mod locate;
pub mod overlay;
pub mod segment;

pub use config::TrackerConfig;
pub use distance::{DistanceModel, TrackingError};
pub use hsv::{ColorTarget, Hsv, HueBand};
pub use locate::{locate, BoundingRegion};
pub use overlay::{render_overlay, write_overlay, OverlayError};
pub use segment::{segment, Mask};

use camera_capture::VideoFrame;

/// Per-frame detection result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Region enclosing all target-colored pixels
    pub region: BoundingRegion,
    /// Bearing and range error derived from the region
    pub error: TrackingError,
}

/// Color target tracker
pub struct ColorTracker {
    target: ColorTarget,
    distance: DistanceModel,
}

impl ColorTracker {
    /// Create a tracker from configuration
    pub fn new(config: &TrackerConfig) -> Self {
        let target = ColorTarget::from_config(config);
        tracing::info!(
            "Tracking rgb {:?}: band {:?} - {:?}",
            config.target_rgb,
            target.band.lower,
            target.band.upper
        );
        Self {
            target,
            distance: config.distance,
        }
    }

    /// The color being tracked
    pub fn target(&self) -> &ColorTarget {
        &self.target
    }

    /// Segment and locate the target; `None` when no pixel is in band
    pub fn locate(&self, frame: &VideoFrame) -> Option<BoundingRegion> {
        let mask = segment(frame, &self.target.band);
        locate(&mask)
    }

    /// Full detection against a standoff distance
    pub fn detect(
        &self,
        frame: &VideoFrame,
        frame_width: u32,
        target_distance_cm: f64,
    ) -> Option<Detection> {
        let region = self.locate(frame)?;
        let error = TrackingError::from_region(&region, frame_width, &self.distance, target_distance_cm);
        Some(Detection { region, error })
    }
}
