//! In-memory collaborators for tests and dry runs.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use image::Rgba;
use pathreplay_common::error::{PathreplayError, PathreplayResult};
use tokio::time::Instant;

use crate::devices::{Frame, FrameSource, GeometryProbe, PointerDevice};
use crate::space::{Point, Size};

/// A pointer move observed by [`StubPointer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedMove {
    pub at: Instant,
    pub target: Point,
}

/// Shared view of the moves a [`StubPointer`] has received.
pub type MoveLog = Arc<Mutex<Vec<RecordedMove>>>;

/// Pointer that replays scripted reads and records every move.
///
/// Once the script is exhausted, reads return the last position moved to
/// (or the last scripted position).
pub struct StubPointer {
    script: VecDeque<Option<Point>>,
    current: Point,
    moves: MoveLog,
    fail_moves: bool,
}

impl StubPointer {
    /// Create a stub that reads `script` in order. `None` entries fail.
    pub fn new(script: Vec<Option<Point>>) -> Self {
        Self {
            script: script.into(),
            current: Point::new(0.0, 0.0),
            moves: Arc::new(Mutex::new(Vec::new())),
            fail_moves: false,
        }
    }

    /// A stub that always reports the same position.
    pub fn fixed(position: Point) -> Self {
        let mut stub = Self::new(Vec::new());
        stub.current = position;
        stub
    }

    /// Make every `move_to` fail.
    pub fn failing_moves(mut self) -> Self {
        self.fail_moves = true;
        self
    }

    /// Handle to the recorded moves, usable after the stub is moved away.
    pub fn moves(&self) -> MoveLog {
        self.moves.clone()
    }
}

impl PointerDevice for StubPointer {
    fn position(&mut self) -> PathreplayResult<Point> {
        match self.script.pop_front() {
            Some(Some(point)) => {
                self.current = point;
                Ok(point)
            }
            Some(None) => Err(PathreplayError::pointer("scripted read failure")),
            None => Ok(self.current),
        }
    }

    fn move_to(&mut self, target: Point) -> PathreplayResult<()> {
        if self.fail_moves {
            return Err(PathreplayError::pointer("scripted move failure"));
        }
        self.current = target;
        if let Ok(mut moves) = self.moves.lock() {
            moves.push(RecordedMove {
                at: Instant::now(),
                target,
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Frame source that produces blank frames of a fixed size.
pub struct StubFrameSource {
    size: Size,
    fail: bool,
}

impl StubFrameSource {
    pub fn new(size: Size) -> Self {
        Self { size, fail: false }
    }

    /// A source whose every capture fails.
    pub fn failing() -> Self {
        Self {
            size: Size::new(0, 0),
            fail: true,
        }
    }
}

impl FrameSource for StubFrameSource {
    fn capture(&mut self) -> PathreplayResult<Frame> {
        if self.fail {
            return Err(PathreplayError::capture("scripted capture failure"));
        }
        Ok(Frame::from_pixel(
            self.size.width,
            self.size.height,
            Rgba([32, 32, 40, 255]),
        ))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Probe that reports fixed sizes.
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe {
    pub logical: Size,
    pub physical: Size,
}

impl GeometryProbe for StaticProbe {
    fn logical_size(&mut self) -> PathreplayResult<Size> {
        Ok(self.logical)
    }

    fn physical_size(&mut self) -> PathreplayResult<Size> {
        Ok(self.physical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_reads_then_holds_last() {
        let mut pointer = StubPointer::new(vec![Some(Point::new(1.0, 2.0)), None]);
        assert_eq!(pointer.position().unwrap(), Point::new(1.0, 2.0));
        assert!(pointer.position().is_err());
        assert_eq!(pointer.position().unwrap(), Point::new(1.0, 2.0));
    }

    #[tokio::test]
    async fn moves_are_visible_through_handle() {
        let mut pointer = StubPointer::fixed(Point::new(0.0, 0.0));
        let log = pointer.moves();
        pointer.move_to(Point::new(5.0, 6.0)).unwrap();
        let moves = log.lock().unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].target, Point::new(5.0, 6.0));
    }
}
