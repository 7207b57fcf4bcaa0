//! Collaborator contracts: pointer I/O, frame capture and display probing.

use image::RgbaImage;
use pathreplay_common::error::PathreplayResult;

use crate::space::{Point, Size};

/// A captured frame in physical space.
pub type Frame = RgbaImage;

/// Pointer I/O in logical space.
pub trait PointerDevice: Send {
    /// Current pointer position.
    fn position(&mut self) -> PathreplayResult<Point>;

    /// Move the pointer to `target`.
    fn move_to(&mut self, target: Point) -> PathreplayResult<()>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Frame capture in physical space.
pub trait FrameSource: Send {
    /// Grab the whole display.
    fn capture(&mut self) -> PathreplayResult<Frame>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// One-time queries used to resolve a [`crate::ScreenGeometry`].
pub trait GeometryProbe {
    /// Extent the pointer I/O primitive understands.
    fn logical_size(&mut self) -> PathreplayResult<Size>;

    /// Extent of frames the capture primitive produces.
    fn physical_size(&mut self) -> PathreplayResult<Size>;
}

/// Size of a captured frame.
pub fn frame_size(frame: &Frame) -> Size {
    Size::new(frame.width(), frame.height())
}
