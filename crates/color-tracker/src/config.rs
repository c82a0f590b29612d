//! Tracker configuration

use serde::{Deserialize, Serialize};

use crate::distance::DistanceModel;

/// Color tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Reference color of the target (RGB)
    pub target_rgb: [u8; 3],

    /// Half-width of the hue band around the reference hue
    pub hue_tolerance: u8,

    /// Lower saturation bound of the band
    pub saturation_min: u8,

    /// Lower value bound of the band
    pub value_min: u8,

    /// Range estimation calibration
    pub distance: DistanceModel,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            target_rgb: [255, 255, 0],
            hue_tolerance: 10,
            saturation_min: 100,
            value_min: 100,
            distance: DistanceModel::default(),
        }
    }
}
