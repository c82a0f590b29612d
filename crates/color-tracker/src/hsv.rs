//! HSV conversion and hue bands
//!
//! Uses the 8-bit convention: hue in `[0, 179]` (degrees halved),
//! saturation and value in `[0, 255]`.

use serde::{Deserialize, Serialize};

use crate::config::TrackerConfig;

/// Largest representable hue
pub const HUE_MAX: u8 = 179;

/// Hues that select the fixed yellow band
pub const YELLOW_HUES: std::ops::RangeInclusive<u8> = 20..=30;

/// Fixed band used for yellow targets
pub const YELLOW_BAND: HueBand = HueBand {
    lower: [20, 100, 100],
    upper: [30, 255, 255],
};

/// A pixel in HSV space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    /// Convert an RGB pixel
    pub fn from_rgb([r, g, b]: [u8; 3]) -> Self {
        let (r, g, b) = (r as i32, g as i32, b as i32);
        let v = r.max(g).max(b);
        let min = r.min(g).min(b);
        let diff = v - min;

        let s = if v == 0 {
            0
        } else {
            ((255 * diff) as f64 / v as f64).round() as i32
        };

        let h = if diff == 0 {
            0
        } else {
            let sector = if v == r {
                g - b
            } else if v == g {
                b - r + 2 * diff
            } else {
                r - g + 4 * diff
            };
            // Halves round up, so -0.5 lands on 0 rather than wrapping to 179
            let h = (30.0 * sector as f64 / diff as f64 + 0.5).floor() as i32;
            if h < 0 {
                h + 180
            } else {
                h
            }
        };

        Self {
            h: h as u8,
            s: s as u8,
            v: v as u8,
        }
    }
}

/// Inclusive HSV band, component-wise `lower <= pixel <= upper`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HueBand {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HueBand {
    /// Derive the band for a reference hue.
    ///
    /// Yellow hues get the fixed [`YELLOW_BAND`]; everything else gets a
    /// symmetric band clamped to `[0, HUE_MAX]`.
    pub fn around_hue(hue: u8, tolerance: u8, saturation_min: u8, value_min: u8) -> Self {
        if YELLOW_HUES.contains(&hue) {
            return YELLOW_BAND;
        }
        let hue = hue.min(HUE_MAX);
        Self {
            lower: [hue.saturating_sub(tolerance), saturation_min, value_min],
            upper: [hue.saturating_add(tolerance).min(HUE_MAX), 255, 255],
        }
    }

    /// Whether an HSV pixel falls inside the band
    pub fn contains(&self, hsv: Hsv) -> bool {
        let px = [hsv.h, hsv.s, hsv.v];
        px.iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(p, (lo, hi))| lo <= p && p <= hi)
    }
}

/// Reference color and its derived band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTarget {
    pub reference_rgb: [u8; 3],
    pub band: HueBand,
}

impl ColorTarget {
    /// Derive the target band from a reference color
    pub fn from_rgb(rgb: [u8; 3], tolerance: u8, saturation_min: u8, value_min: u8) -> Self {
        let hue = Hsv::from_rgb(rgb).h;
        Self {
            reference_rgb: rgb,
            band: HueBand::around_hue(hue, tolerance, saturation_min, value_min),
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::from_rgb(
            config.target_rgb,
            config.hue_tolerance,
            config.saturation_min,
            config.value_min,
        )
    }
}
