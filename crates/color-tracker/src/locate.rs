//! Target localization

use serde::{Deserialize, Serialize};

use crate::segment::Mask;

/// Axis-aligned box in pixel coordinates.
///
/// Bounds are the inclusive extremes of the in-band pixels, so a single
/// pixel gives a zero-width region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingRegion {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingRegion {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Horizontal extent in pixels
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    /// Vertical extent in pixels
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// Integer horizontal center
    pub fn center_x(&self) -> u32 {
        (self.x1 + self.x2) / 2
    }

    /// Integer vertical center
    pub fn center_y(&self) -> u32 {
        (self.y1 + self.y2) / 2
    }

    fn include(&mut self, x: u32, y: u32) {
        self.x1 = self.x1.min(x);
        self.y1 = self.y1.min(y);
        self.x2 = self.x2.max(x);
        self.y2 = self.y2.max(y);
    }
}

/// Tightest box around every non-zero mask pixel, or `None` for an empty mask.
///
/// All in-band pixels count, so stray same-colored pixels elsewhere in the
/// frame widen the box.
pub fn locate(mask: &Mask) -> Option<BoundingRegion> {
    let mut region: Option<BoundingRegion> = None;

    for (x, y, px) in mask.enumerate_pixels() {
        if px[0] == 0 {
            continue;
        }
        match region.as_mut() {
            Some(r) => r.include(x, y),
            None => region = Some(BoundingRegion::new(x, y, x, y)),
        }
    }

    region
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn mask_with(width: u32, height: u32, points: &[(u32, u32)]) -> Mask {
        let mut mask = Mask::new(width, height);
        for &(x, y) in points {
            mask.put_pixel(x, y, Luma([255]));
        }
        mask
    }

    #[test]
    fn test_empty_mask_is_absent() {
        assert_eq!(locate(&Mask::new(64, 48)), None);
    }

    #[test]
    fn test_two_pixels_span_region() {
        let mask = mask_with(100, 100, &[(10, 10), (50, 60)]);
        assert_eq!(locate(&mask), Some(BoundingRegion::new(10, 10, 50, 60)));
    }

    #[test]
    fn test_single_pixel_is_zero_width() {
        let region = locate(&mask_with(20, 20, &[(7, 3)])).unwrap();
        assert_eq!(region, BoundingRegion::new(7, 3, 7, 3));
        assert_eq!(region.width(), 0);
        assert_eq!(region.height(), 0);
    }

    #[test]
    fn test_spurious_pixel_widens_region() {
        let mut points: Vec<(u32, u32)> = (20..30).flat_map(|x| (20..30).map(move |y| (x, y))).collect();
        points.push((90, 5));
        let region = locate(&mask_with(100, 100, &points)).unwrap();
        assert_eq!(region, BoundingRegion::new(20, 5, 90, 29));
        assert_eq!(region.center_x(), 55);
    }
}
