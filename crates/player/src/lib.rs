//! Pathreplay Player
//!
//! Drives the pointer through a recorded trace on the current machine.
//! Every recorded position is taken to unit space with the geometry it was
//! recorded on, then out to the current logical space with a freshly
//! resolved geometry. Moves are issued strictly in order from a single
//! loop, each one due at `start + (offset - first_offset)`, so a slow move
//! delays only the moves that were already due behind it.

use std::time::Duration;

use pathreplay_common::clock::{duration_to_ms, DriftMeasurement, RecordingClock};
use pathreplay_common::error::PathreplayResult;
use pathreplay_platform_core::{CoordinateSpace, Point, PointerDevice, ScreenGeometry};
use pathreplay_trace_model::{OffsetMs, Recording};
use tokio_util::sync::CancellationToken;

/// One positioning command, ready to issue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedMove {
    /// Delay from the first move.
    pub due_ms: OffsetMs,
    /// Target in the current logical space.
    pub target: Point,
}

/// Maps recorded positions onto the current display.
#[derive(Debug, Clone, Copy)]
pub struct Remapper {
    space: CoordinateSpace,
    recorded: ScreenGeometry,
    current: ScreenGeometry,
}

impl Remapper {
    /// Build the mapping for `recording` on a display with `current` geometry.
    ///
    /// Traces without recorded geometry are assumed to come from this
    /// machine. That only matters for logical and physical traces.
    pub fn new(recording: &Recording, current: ScreenGeometry) -> Self {
        let space = recording.space();
        let recorded = match recording.header.geometry {
            Some(geometry) => geometry,
            None => {
                if space != CoordinateSpace::Unit {
                    tracing::warn!(
                        space = %space,
                        "Trace carries no recording geometry, assuming the current display"
                    );
                }
                current
            }
        };
        Self {
            space,
            recorded,
            current,
        }
    }

    /// Recorded position → current logical position.
    pub fn to_current_logical(&self, recorded: Point) -> Point {
        let unit = self.recorded.to_unit(recorded, self.space);
        self.current.from_unit(unit, CoordinateSpace::Logical)
    }
}

/// Convert a recording into its ordered list of moves.
pub fn plan(recording: &Recording, current: ScreenGeometry) -> Vec<PlannedMove> {
    let remapper = Remapper::new(recording, current);
    let first = recording
        .samples
        .first()
        .map(|s| s.offset_ms)
        .unwrap_or_default();

    recording
        .samples
        .iter()
        .map(|sample| PlannedMove {
            due_ms: sample.offset_ms - first,
            target: remapper.to_current_logical(sample.position),
        })
        .collect()
}

/// Summary of one playback.
#[derive(Debug, Clone)]
pub struct PlaybackReport {
    /// Moves attempted.
    pub moves_issued: usize,
    /// Moves the pointer refused.
    pub move_failures: usize,
    /// Stopped before the last move.
    pub cancelled: bool,
    /// Span of the recording vs measured playback time.
    pub drift: DriftMeasurement,
    /// Worst lateness of any single move.
    pub max_lateness: Duration,
}

/// Replays recordings through a pointer device.
pub struct Player {
    pointer: Box<dyn PointerDevice>,
    geometry: ScreenGeometry,
}

impl Player {
    /// `geometry` must describe the display `pointer` drives.
    pub fn new(pointer: Box<dyn PointerDevice>, geometry: ScreenGeometry) -> Self {
        Self { pointer, geometry }
    }

    /// Play `recording` to the end, or until `cancel` fires.
    ///
    /// A move the pointer refuses is logged and skipped.
    pub async fn play(
        &mut self,
        recording: &Recording,
        cancel: CancellationToken,
    ) -> PathreplayResult<PlaybackReport> {
        recording.validate()?;
        let moves = plan(recording, self.geometry);

        tracing::info!(
            pointer = %self.pointer.name(),
            samples = moves.len(),
            span_ms = recording.span_ms(),
            space = %recording.space(),
            current = %self.geometry.logical,
            "Playback started"
        );

        let clock = RecordingClock::start();
        let mut moves_issued = 0;
        let mut move_failures = 0;
        let mut max_lateness = Duration::ZERO;
        let mut cancelled = false;

        for planned in &moves {
            let due = clock.at_offset_ms(planned.due_ms);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                _ = tokio::time::sleep_until(due) => {}
            }

            max_lateness = max_lateness.max(tokio::time::Instant::now().saturating_duration_since(due));
            moves_issued += 1;
            if let Err(e) = self.pointer.move_to(planned.target) {
                move_failures += 1;
                tracing::warn!(due_ms = planned.due_ms, error = %e, "Pointer move failed");
                continue;
            }
            tracing::debug!(
                due_ms = planned.due_ms,
                x = planned.target.x,
                y = planned.target.y,
                "Moved pointer"
            );
        }

        let drift = DriftMeasurement {
            reference_ms: moves.last().map(|m| m.due_ms).unwrap_or_default(),
            measured_ms: duration_to_ms(clock.elapsed()),
        };

        tracing::info!(
            moves = moves_issued,
            failures = move_failures,
            cancelled,
            drift_ms = drift.drift_ms(),
            "Playback finished"
        );

        Ok(PlaybackReport {
            moves_issued,
            move_failures,
            cancelled,
            drift,
            max_lateness,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathreplay_platform_core::Size;
    use pathreplay_trace_model::{Sample, TraceHeader};

    fn recording(space: CoordinateSpace, geometry: Option<ScreenGeometry>) -> Recording {
        let mut header = TraceHeader::legacy(space);
        header.geometry = geometry;
        Recording::new(
            header,
            vec![
                Sample::new(500, 960.0, 540.0),
                Sample::new(1500, 1920.0, 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn plan_is_relative_to_first_sample() {
        let geometry = ScreenGeometry::uniform(1920, 1080).unwrap();
        let moves = plan(&recording(CoordinateSpace::Logical, Some(geometry)), geometry);
        assert_eq!(moves[0].due_ms, 0);
        assert_eq!(moves[1].due_ms, 1000);
        assert_eq!(moves[1].target, Point::new(1920.0, 0.0));
    }

    #[test]
    fn physical_trace_lands_in_current_logical_space() {
        let recorded = ScreenGeometry::new(Size::new(960, 540), Size::new(1920, 1080)).unwrap();
        let current = ScreenGeometry::uniform(1280, 720).unwrap();
        let moves = plan(&recording(CoordinateSpace::Physical, Some(recorded)), current);
        assert_eq!(moves[0].target, Point::new(640.0, 360.0));
    }

    #[test]
    fn missing_geometry_falls_back_to_current_display() {
        let current = ScreenGeometry::uniform(3840, 2160).unwrap();
        let moves = plan(&recording(CoordinateSpace::Logical, None), current);
        assert_eq!(moves[0].target, Point::new(960.0, 540.0));
    }
}
