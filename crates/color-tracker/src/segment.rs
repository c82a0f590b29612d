//! Hue-band segmentation

use camera_capture::VideoFrame;
use image::GrayImage;

use crate::hsv::{Hsv, HueBand};

/// Binary mask: 255 for in-band pixels, 0 otherwise
pub type Mask = GrayImage;

/// Value written for in-band pixels
pub const IN_BAND: u8 = 255;

/// Classify every pixel of the frame against the band.
///
/// A frame whose buffer does not match its geometry yields an empty mask.
pub fn segment(frame: &VideoFrame, band: &HueBand) -> Mask {
    if !frame.is_well_formed() {
        tracing::warn!(
            "Frame {} buffer does not match {}x{}",
            frame.sequence,
            frame.width,
            frame.height
        );
        return Mask::new(frame.width, frame.height);
    }

    let data = frame
        .pixels()
        .map(|px| if band.contains(Hsv::from_rgb(px)) { IN_BAND } else { 0 })
        .collect();

    Mask::from_raw(frame.width, frame.height, data)
        .unwrap_or_else(|| Mask::new(frame.width, frame.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hsv::YELLOW_BAND;

    #[test]
    fn test_segment_marks_target_pixels() {
        let mut frame = VideoFrame::solid(6, 4, [0, 0, 255]);
        frame.set_pixel(2, 1, [255, 255, 0]);
        frame.set_pixel(5, 3, [230, 220, 30]);

        let mask = segment(&frame, &YELLOW_BAND);
        assert_eq!(mask.dimensions(), (6, 4));
        assert_eq!(mask.get_pixel(2, 1)[0], IN_BAND);
        assert_eq!(mask.get_pixel(5, 3)[0], IN_BAND);
        assert_eq!(mask.pixels().filter(|p| p[0] == IN_BAND).count(), 2);
    }

    #[test]
    fn test_dark_pixels_rejected() {
        // Right hue, but value below the band floor
        let frame = VideoFrame::solid(3, 3, [80, 80, 0]);
        let mask = segment(&frame, &YELLOW_BAND);
        assert!(mask.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_malformed_frame_gives_empty_mask() {
        let frame = VideoFrame::new(vec![255, 255, 0], 4, 4, 0, 0);
        let mask = segment(&frame, &YELLOW_BAND);
        assert_eq!(mask.dimensions(), (4, 4));
        assert!(mask.pixels().all(|p| p[0] == 0));
    }
}
