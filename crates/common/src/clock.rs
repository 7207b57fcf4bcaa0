//! Clock and timing utilities for sampling and playback.
//!
//! All timing is anchored to a monotonic epoch recorded at start and
//! measured with `tokio::time::Instant`, so tests can drive it with
//! tokio's paused clock. This module provides:
//! - The recording epoch
//! - A fixed-period ticker that does not accumulate drift
//! - Drift measurement between an expected and a measured offset

use std::time::Duration;

use tokio::time::Instant;

/// A recording clock that provides monotonic offsets relative to
/// a fixed epoch (the moment recording or playback started).
#[derive(Debug, Clone)]
pub struct RecordingClock {
    /// The instant recording started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl RecordingClock {
    /// Create a new recording clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a clock from a known epoch.
    pub fn from_epoch(epoch: Instant, wall: String) -> Self {
        Self {
            epoch,
            epoch_wall: wall,
        }
    }

    /// Time elapsed since the epoch.
    pub fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Whole milliseconds elapsed since the epoch.
    pub fn elapsed_ms(&self) -> u64 {
        duration_to_ms(self.elapsed())
    }

    /// Wall-clock time at recording start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// The underlying epoch instant.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// The instant `offset_ms` after the epoch.
    pub fn at_offset_ms(&self, offset_ms: u64) -> Instant {
        self.epoch + Duration::from_millis(offset_ms)
    }
}

/// Convert a duration to whole milliseconds, saturating.
pub fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Drift between where a stream should be and where it is.
#[derive(Debug, Clone, Copy)]
pub struct DriftMeasurement {
    /// Expected offset (ms).
    pub reference_ms: u64,
    /// Measured offset (ms).
    pub measured_ms: u64,
}

impl DriftMeasurement {
    /// Drift in milliseconds (positive = measured is behind schedule).
    pub fn drift_ms(&self) -> i64 {
        self.measured_ms as i64 - self.reference_ms as i64
    }

    /// Whether drift exceeds an acceptable threshold.
    pub fn exceeds_threshold_ms(&self, threshold_ms: u64) -> bool {
        self.drift_ms().unsigned_abs() > threshold_ms
    }
}

/// Fixed-period scheduler owning a single timer.
///
/// Tick `k` is due at `epoch + k * period`; the first tick is due at the
/// epoch itself. A tick that fires late is reported once, stamped with the
/// measured elapsed time, and the grid slots it overran are folded into it.
/// Ticks due at or after the deadline are never taken.
#[derive(Debug)]
pub struct Ticker {
    epoch: Instant,
    period: Duration,
    deadline: Instant,
    next_slot: u64,
    fired: u64,
}

impl Ticker {
    /// Create a ticker whose first tick is due at `epoch`.
    ///
    /// `period` must be non-zero.
    pub fn new(epoch: Instant, period: Duration, duration: Duration) -> Self {
        debug_assert!(!period.is_zero(), "ticker period must be non-zero");
        Self {
            epoch,
            period,
            deadline: epoch + duration,
            next_slot: 0,
            fired: 0,
        }
    }

    /// When the next tick is due, or `None` once the deadline is reached.
    pub fn next_due(&self) -> Option<Instant> {
        let period_ns = self.period.as_nanos().max(1);
        let offset_ns = period_ns.saturating_mul(self.next_slot as u128);
        let offset = Duration::from_nanos(u64::try_from(offset_ns).unwrap_or(u64::MAX));
        let due = self.epoch.checked_add(offset)?;
        (due < self.deadline).then_some(due)
    }

    /// Wait for the next tick and return the measured elapsed time since the
    /// epoch, or `None` when the deadline has been reached.
    ///
    /// Cancel-safe: dropping the future before it resolves leaves the
    /// schedule untouched.
    pub async fn tick(&mut self) -> Option<Duration> {
        let due = self.next_due()?;
        tokio::time::sleep_until(due).await;
        self.fire(Instant::now())
    }

    fn fire(&mut self, now: Instant) -> Option<Duration> {
        if now >= self.deadline {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.epoch);
        let period_ns = self.period.as_nanos().max(1);
        let current_slot = (elapsed.as_nanos() / period_ns) as u64;
        self.next_slot = current_slot + 1;
        self.fired += 1;
        Some(elapsed)
    }

    /// Number of ticks fired so far.
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Sampling period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Instant after which no tick fires.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}
