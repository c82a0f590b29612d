//! Range and bearing estimation

use serde::{Deserialize, Serialize};

use crate::locate::BoundingRegion;

/// Single-point calibration of apparent width against distance.
///
/// A target spanning `reference_fraction` of the frame width is taken to be
/// `reference_distance_cm` away; distance scales inversely with width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceModel {
    pub reference_distance_cm: f64,
    pub reference_fraction: f64,
}

impl Default for DistanceModel {
    fn default() -> Self {
        Self {
            reference_distance_cm: 50.0,
            reference_fraction: 0.5,
        }
    }
}

impl DistanceModel {
    /// Estimated distance in centimeters; infinite for a zero-width region
    pub fn estimate(&self, region: &BoundingRegion, frame_width: u32) -> f64 {
        let object_width = region.width();
        if object_width == 0 {
            return f64::INFINITY;
        }
        let reference_width = frame_width as f64 * self.reference_fraction;
        (reference_width * self.reference_distance_cm) / object_width as f64
    }
}

/// Horizontal offset of the region center from the frame center,
/// normalized by half the frame width. Negative means the target is left.
pub fn bearing_error(region: &BoundingRegion, frame_width: u32) -> f64 {
    if frame_width == 0 {
        return 0.0;
    }
    let center_x = (frame_width / 2) as f64;
    let offset = region.center_x() as f64 - center_x;
    (offset / (frame_width as f64 / 2.0)).clamp(-1.0, 1.0)
}

/// Transient error pair fed to the steering law
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingError {
    /// Normalized bearing error in `[-1, 1]`
    pub bearing_error: f64,
    /// Estimated distance (cm)
    pub distance_cm: f64,
    /// `distance_cm - target`, positive when too far
    pub distance_error: f64,
}

impl TrackingError {
    pub fn from_region(
        region: &BoundingRegion,
        frame_width: u32,
        model: &DistanceModel,
        target_distance_cm: f64,
    ) -> Self {
        let distance_cm = model.estimate(region, frame_width);
        Self {
            bearing_error: bearing_error(region, frame_width),
            distance_cm,
            distance_error: distance_cm - target_distance_cm,
        }
    }
}
