//! Frame annotation and encoding.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgba};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use pathreplay_common::error::{PathreplayError, PathreplayResult};
use pathreplay_platform_core::{Frame, Point};

/// Half-length of each crosshair arm, in physical pixels.
pub const CROSSHAIR_ARM: u32 = 15;
/// Stroke width of the crosshair, in physical pixels.
pub const CROSSHAIR_THICKNESS: u32 = 3;
/// Crosshair colour.
pub const CROSSHAIR_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Draw a crosshair centred on `at` (physical space).
///
/// Parts falling outside the frame are cut off; a centre entirely outside
/// leaves the frame untouched.
pub fn draw_crosshair(frame: &mut Frame, at: Point) {
    let (cx, cy) = at.rounded();
    let arm = CROSSHAIR_ARM as i32;
    let half = (CROSSHAIR_THICKNESS / 2) as i32;

    let horizontal = Rect::at(cx - arm, cy - half).of_size(2 * CROSSHAIR_ARM, CROSSHAIR_THICKNESS);
    let vertical = Rect::at(cx - half, cy - arm).of_size(CROSSHAIR_THICKNESS, 2 * CROSSHAIR_ARM);

    draw_filled_rect_mut(frame, horizontal, CROSSHAIR_COLOR);
    draw_filled_rect_mut(frame, vertical, CROSSHAIR_COLOR);
}

/// Encode a frame as PNG.
pub fn encode_png(frame: &Frame) -> PathreplayResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    frame
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| PathreplayError::capture(format!("Failed to encode frame: {e}")))?;
    Ok(buf.into_inner())
}

/// Path an annotated frame is dumped to for inspection.
pub fn debug_frame_path(dir: &Path, at: Point, unix_secs: i64) -> PathBuf {
    let (x, y) = at.rounded();
    dir.join(format!("debug_x{x}_y{y}_t{unix_secs}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(w: u32, h: u32) -> Frame {
        Frame::from_pixel(w, h, Rgba([0, 0, 0, 255]))
    }

    #[test]
    fn crosshair_marks_centre_and_arms() {
        let mut frame = blank(100, 100);
        draw_crosshair(&mut frame, Point::new(50.0, 50.0));
        assert_eq!(*frame.get_pixel(50, 50), CROSSHAIR_COLOR);
        assert_eq!(*frame.get_pixel(36, 50), CROSSHAIR_COLOR);
        assert_eq!(*frame.get_pixel(50, 64), CROSSHAIR_COLOR);
        assert_eq!(*frame.get_pixel(60, 60), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn crosshair_at_edge_is_clipped() {
        let mut frame = blank(40, 40);
        draw_crosshair(&mut frame, Point::new(0.0, 39.0));
        assert_eq!(*frame.get_pixel(0, 39), CROSSHAIR_COLOR);

        let mut outside = blank(40, 40);
        draw_crosshair(&mut outside, Point::new(500.0, 500.0));
        assert!(outside.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn png_encoding_has_signature() {
        let png = encode_png(&blank(8, 8)).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn debug_path_names_position_and_time() {
        let path = debug_frame_path(Path::new("/tmp/frames"), Point::new(10.4, 20.6), 1_700_000_000);
        assert_eq!(
            path,
            PathBuf::from("/tmp/frames/debug_x10_y21_t1700000000.png")
        );
    }
}
