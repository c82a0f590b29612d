//! Debug overlay rendering

use std::path::Path;

use camera_capture::VideoFrame;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use thiserror::Error;

use crate::locate::BoundingRegion;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CENTERLINE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const BOX_THICKNESS: u32 = 5;

/// Overlay error types
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Frame buffer does not match {0}x{1}")]
    InvalidFrame(u32, u32),

    #[error("Failed to write overlay: {0}")]
    Write(#[from] image::ImageError),
}

/// Draw the frame centerline and, when present, the target box and center
pub fn render_overlay(
    frame: &VideoFrame,
    region: Option<&BoundingRegion>,
) -> Result<RgbImage, OverlayError> {
    let mut canvas = frame
        .to_image()
        .ok_or(OverlayError::InvalidFrame(frame.width, frame.height))?;

    let center_x = (frame.width / 2) as f32;
    draw_line_segment_mut(
        &mut canvas,
        (center_x, 0.0),
        (center_x, frame.height.saturating_sub(1) as f32),
        CENTERLINE_COLOR,
    );

    if let Some(region) = region {
        for inset in 0..BOX_THICKNESS {
            let x = region.x1 as i32 - inset as i32;
            let y = region.y1 as i32 - inset as i32;
            let rect = Rect::at(x, y).of_size(region.width() + 1 + 2 * inset, region.height() + 1 + 2 * inset);
            draw_hollow_rect_mut(&mut canvas, rect, BOX_COLOR);
        }
        draw_filled_circle_mut(
            &mut canvas,
            (region.center_x() as i32, region.center_y() as i32),
            4,
            BOX_COLOR,
        );
    }

    Ok(canvas)
}

/// Render and write the overlay to `path`
pub fn write_overlay(
    frame: &VideoFrame,
    region: Option<&BoundingRegion>,
    path: &Path,
) -> Result<(), OverlayError> {
    render_overlay(frame, region)?.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_drawn_around_region() {
        let frame = VideoFrame::solid(100, 80, [0, 0, 0]);
        let region = BoundingRegion::new(20, 20, 60, 50);
        let image = render_overlay(&frame, Some(&region)).unwrap();

        assert_eq!(image.get_pixel(20, 35), &BOX_COLOR);
        assert_eq!(image.get_pixel(16, 35), &BOX_COLOR);
        assert_eq!(image.get_pixel(30, 30), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(50, 5), &CENTERLINE_COLOR);
    }

    #[test]
    fn test_overlay_without_target() {
        let frame = VideoFrame::solid(10, 10, [1, 2, 3]);
        let image = render_overlay(&frame, None).unwrap();
        assert_eq!(image.get_pixel(0, 0), &Rgb([1, 2, 3]));
        assert_eq!(image.get_pixel(5, 5), &CENTERLINE_COLOR);
    }

    #[test]
    fn test_write_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.png");
        let frame = VideoFrame::solid(10, 10, [1, 2, 3]);
        write_overlay(&frame, None, &path).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_malformed_frame_rejected() {
        let frame = VideoFrame::new(vec![0; 5], 10, 10, 0, 0);
        assert!(matches!(
            render_overlay(&frame, None),
            Err(OverlayError::InvalidFrame(10, 10))
        ));
    }
}
