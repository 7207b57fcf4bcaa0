//! Samples and recordings.

use pathreplay_common::error::{PathreplayError, PathreplayResult};
use pathreplay_platform_core::{CoordinateSpace, Point};
use serde::{Deserialize, Serialize};

use crate::header::TraceHeader;

/// Milliseconds since recording start.
pub type OffsetMs = u64;

/// One timestamped pointer observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Measured time since recording start.
    pub offset_ms: OffsetMs,

    /// Pointer position in the trace's coordinate space.
    pub position: Point,

    /// Vision estimate in the same space, for callers that pair a sample
    /// with an estimate in memory (see [`Sample::with_estimate`]).
    ///
    /// The recorder never fills this and the row codec never writes it;
    /// live estimates travel as `EstimateReport`s instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<Point>,
}

impl Sample {
    pub fn new(offset_ms: OffsetMs, x: f64, y: f64) -> Self {
        Self {
            offset_ms,
            position: Point::new(x, y),
            estimate: None,
        }
    }

    /// Attach an estimate expressed in the same space as `position`.
    pub fn with_estimate(mut self, estimate: Point) -> Self {
        self.estimate = Some(estimate);
        self
    }
}

/// An ordered sequence of samples sharing one coordinate space.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub header: TraceHeader,
    pub samples: Vec<Sample>,
}

impl Recording {
    /// Build a finalized recording, enforcing its invariants.
    pub fn new(header: TraceHeader, samples: Vec<Sample>) -> PathreplayResult<Self> {
        let recording = Self { header, samples };
        recording.validate()?;
        Ok(recording)
    }

    /// Space every sample is expressed in.
    pub fn space(&self) -> CoordinateSpace {
        self.header.coordinate_space
    }

    /// Offset of the last sample.
    pub fn last_offset_ms(&self) -> OffsetMs {
        self.samples.last().map(|s| s.offset_ms).unwrap_or(0)
    }

    /// Span between the first and last sample.
    pub fn span_ms(&self) -> OffsetMs {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.offset_ms - first.offset_ms,
            _ => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Non-empty, strictly increasing offsets.
    pub fn validate(&self) -> PathreplayResult<()> {
        if self.samples.is_empty() {
            return Err(PathreplayError::malformed_log("recording has no samples"));
        }
        for pair in self.samples.windows(2) {
            if pair[1].offset_ms <= pair[0].offset_ms {
                return Err(PathreplayError::malformed_log(format!(
                    "offset {} does not follow {}",
                    pair[1].offset_ms, pair[0].offset_ms
                )));
            }
        }
        Ok(())
    }
}
