//! Pathreplay Recorder
//!
//! Samples the pointer on a fixed wall-clock period and appends each
//! observation to a trace. Sampling is driven by a single
//! [`pathreplay_common::clock::Ticker`]; a tick that fails to read the
//! pointer is logged and skipped, and the run always continues to its
//! deadline or cancellation.
//!
//! When a frame source and an [`EstimatorDispatch`] are attached, each tick
//! also captures a frame and hands it to the estimator without waiting for
//! it. The capture itself runs on the blocking pool but is awaited before
//! the next tick, so a frame source slower than the period makes later
//! ticks fire late; those are coalesced onto the grid, never bursted.

pub mod writer;

use std::time::Duration;

use pathreplay_common::clock::{duration_to_ms, RecordingClock, Ticker};
use pathreplay_common::error::{PathreplayError, PathreplayResult};
use pathreplay_estimator::{DispatchStats, EstimatorDispatch, Observation};
use pathreplay_platform_core::{CoordinateSpace, FrameSource, PointerDevice, ScreenGeometry};
use pathreplay_trace_model::{Sample, TraceHeader};
use tokio_util::sync::CancellationToken;

pub use writer::TraceWriter;

/// Lifecycle of a [`Sampler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    /// Created, not started.
    Idle,
    /// Ticking.
    Running,
    /// Deadline reached.
    Finished,
    /// Stopped by cancellation.
    Cancelled,
}

/// Sampling parameters.
#[derive(Debug, Clone, Copy)]
pub struct SamplerConfig {
    /// Time between ticks.
    pub period: Duration,
    /// Length of the capture window.
    pub duration: Duration,
    /// Space samples are persisted in.
    pub space: CoordinateSpace,
    /// Geometry used to convert pointer reads into `space`.
    pub geometry: ScreenGeometry,
}

impl SamplerConfig {
    /// Header for a trace written with this configuration.
    pub fn header(&self, clock: &RecordingClock) -> TraceHeader {
        TraceHeader::new(
            self.space,
            self.geometry,
            duration_to_ms(self.period),
            clock.epoch_wall(),
        )
    }
}

/// Summary delivered once when sampling ends.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerReport {
    /// `Finished` or `Cancelled`.
    pub state: SamplerState,
    /// Ticks that fired.
    pub ticks: u64,
    /// Samples appended to the trace.
    pub samples_written: u64,
    /// Ticks lost to pointer read failures.
    pub skipped_ticks: u64,
    /// Ticks whose frame capture failed.
    pub capture_failures: u64,
    /// Estimator activity.
    pub estimates: DispatchStats,
    /// Measured time from start to stop.
    pub elapsed: Duration,
}

/// Fixed-period pointer sampler.
pub struct Sampler {
    config: SamplerConfig,
    pointer: Box<dyn PointerDevice>,
    frames: Option<Box<dyn FrameSource>>,
    estimator: Option<EstimatorDispatch>,
    state: SamplerState,
}

impl Sampler {
    pub fn new(config: SamplerConfig, pointer: Box<dyn PointerDevice>) -> PathreplayResult<Self> {
        if config.period.is_zero() {
            return Err(PathreplayError::config("sampling period must be positive"));
        }
        if config.duration.is_zero() {
            return Err(PathreplayError::config("capture duration must be positive"));
        }
        Ok(Self {
            config,
            pointer,
            frames: None,
            estimator: None,
            state: SamplerState::Idle,
        })
    }

    /// Capture a frame every tick and hand it to `estimator`.
    ///
    /// The period should exceed the frame source's capture time. Shorter
    /// periods still record, with late ticks coalesced and a warning logged.
    pub fn with_estimator(
        mut self,
        frames: Box<dyn FrameSource>,
        estimator: EstimatorDispatch,
    ) -> Self {
        self.frames = Some(frames);
        self.estimator = Some(estimator);
        self
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Sample until the deadline or `cancel` fires, then close `writer`.
    ///
    /// Timestamps are measured from `clock`'s epoch, which is also where
    /// the first tick is due. A write failure aborts the run; every other
    /// per-tick failure is logged and skipped.
    pub async fn run(
        &mut self,
        clock: &RecordingClock,
        writer: TraceWriter,
        cancel: CancellationToken,
    ) -> PathreplayResult<SamplerReport> {
        if self.state != SamplerState::Idle {
            return Err(PathreplayError::config(format!(
                "sampler cannot start from state {:?}",
                self.state
            )));
        }
        if writer.space() != self.config.space {
            return Err(PathreplayError::config(format!(
                "trace space '{}' does not match sampler space '{}'",
                writer.space(),
                self.config.space
            )));
        }

        self.state = SamplerState::Running;
        tracing::info!(
            pointer = %self.pointer.name(),
            period_ms = duration_to_ms(self.config.period),
            duration_ms = duration_to_ms(self.config.duration),
            space = %self.config.space,
            estimator = self.estimator.is_some(),
            "Sampler started"
        );

        let mut writer = writer;
        let mut ticker = Ticker::new(clock.epoch(), self.config.period, self.config.duration);
        let mut skipped_ticks = 0;
        let mut capture_failures = 0;
        let mut overrun_logged = false;

        let outcome = loop {
            let elapsed = tokio::select! {
                biased;
                _ = cancel.cancelled() => break SamplerState::Cancelled,
                tick = ticker.tick() => match tick {
                    Some(elapsed) => elapsed,
                    None => break SamplerState::Finished,
                },
            };

            let offset_ms = duration_to_ms(elapsed);
            if let Some(dispatch) = self.estimator.as_mut() {
                dispatch.on_tick();
            }

            let logical = match self.pointer.position() {
                Ok(point) => point,
                Err(e) => {
                    skipped_ticks += 1;
                    tracing::warn!(offset_ms, error = %e, "Pointer read failed, skipping tick");
                    continue;
                }
            };

            let position =
                self.config
                    .geometry
                    .convert(logical, CoordinateSpace::Logical, self.config.space);
            let sample = Sample {
                offset_ms,
                position,
                estimate: None,
            };

            if let Err(e) = writer.append(&sample) {
                self.state = SamplerState::Cancelled;
                if let Some(dispatch) = self.estimator.as_mut() {
                    dispatch.shutdown();
                }
                tracing::error!(offset_ms, error = %e, "Trace append failed, stopping");
                return Err(e);
            }
            tracing::debug!(offset_ms, x = position.x, y = position.y, "Recorded sample");

            if self.estimator.is_none() {
                continue;
            }
            let Some(frames) = self.frames.take() else {
                continue;
            };

            let started = tokio::time::Instant::now();
            let captured = match tokio::task::spawn_blocking(move || {
                let mut frames = frames;
                let captured = frames.capture();
                (frames, captured)
            })
            .await
            {
                Ok((frames, captured)) => {
                    self.frames = Some(frames);
                    captured
                }
                Err(e) => Err(PathreplayError::capture(format!(
                    "frame source stopped: {e}"
                ))),
            };

            let took = started.elapsed();
            if took > self.config.period && !overrun_logged {
                overrun_logged = true;
                tracing::warn!(
                    offset_ms,
                    capture_ms = duration_to_ms(took),
                    period_ms = duration_to_ms(self.config.period),
                    "Frame capture is slower than the sampling period, later ticks will be coalesced"
                );
            }

            match captured {
                Ok(frame) => {
                    if let Some(dispatch) = self.estimator.as_mut() {
                        dispatch.submit(Observation {
                            offset_ms,
                            truth: logical,
                            frame,
                        });
                    }
                }
                Err(e) => {
                    capture_failures += 1;
                    tracing::warn!(offset_ms, error = %e, "Frame capture failed");
                }
            }
        };

        self.state = outcome;
        let estimates = self
            .estimator
            .as_mut()
            .map(EstimatorDispatch::shutdown)
            .unwrap_or_default();
        let samples_written = writer.close()?;

        let report = SamplerReport {
            state: outcome,
            ticks: ticker.fired(),
            samples_written,
            skipped_ticks,
            capture_failures,
            estimates,
            elapsed: clock.elapsed(),
        };

        tracing::info!(
            state = ?report.state,
            samples = report.samples_written,
            skipped = report.skipped_ticks,
            "Sampler stopped"
        );
        Ok(report)
    }
}
