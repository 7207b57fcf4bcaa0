//! Pathreplay Estimator
//!
//! Cross-checks recorded pointer positions against a vision model. For each
//! observation the frame is annotated with a crosshair at the true pointer
//! location, PNG-encoded and sent to a [`VisionClient`]; the free-text
//! answer is parsed into a point and compared with the truth.
//!
//! Estimates run off the sampling path. [`EstimatorDispatch`] keeps at most
//! one call outstanding: submitting a new observation abandons the previous
//! call, whose result is then never seen. Outcomes are logged and
//! optionally forwarded over a channel; they never reach the primary trace.

pub mod annotate;
pub mod gemini;
pub mod response;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pathreplay_common::error::{PathreplayError, PathreplayResult};
use pathreplay_platform_core::{
    frame_size, unit_from_frame, CoordinateSpace, Frame, Point, ScreenGeometry,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use gemini::GeminiClient;

/// Prompt sent with every annotated frame.
pub const CROSSHAIR_PROMPT: &str = "This screenshot has an artificial red crosshair marker drawn on it. \
Your task is to ignore all other UI elements and find this red crosshair. \
Return only the center x,y coordinates of the crosshair in the format x,y.";

/// A remote model that answers a prompt about an encoded image.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Send `png` with `prompt` and return the model's text answer.
    async fn query(&self, png: &[u8], prompt: &str) -> PathreplayResult<String>;

    /// Client name for logging.
    fn name(&self) -> &str;
}

/// Turns frames into cursor estimates.
pub struct CursorEstimator {
    client: Arc<dyn VisionClient>,
    prompt: String,
    debug_dir: Option<PathBuf>,
}

impl CursorEstimator {
    pub fn new(client: Arc<dyn VisionClient>) -> Self {
        Self {
            client,
            prompt: CROSSHAIR_PROMPT.to_string(),
            debug_dir: None,
        }
    }

    /// Dump every annotated frame into `dir`.
    pub fn with_debug_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.debug_dir = dir;
        self
    }

    /// Estimate the cursor position in `frame`'s pixel space.
    ///
    /// `hint` is where the crosshair is drawn, in the same pixel space.
    /// `Ok(None)` means the model answered but not with two numbers.
    pub async fn estimate(&self, frame: Frame, hint: Point) -> PathreplayResult<Option<Point>> {
        let debug_dir = self.debug_dir.clone();
        let png = tokio::task::spawn_blocking(move || -> PathreplayResult<Vec<u8>> {
            let mut frame = frame;
            annotate::draw_crosshair(&mut frame, hint);
            let png = annotate::encode_png(&frame)?;
            if let Some(dir) = debug_dir {
                let path = annotate::debug_frame_path(&dir, hint, chrono::Utc::now().timestamp());
                if let Err(e) =
                    std::fs::create_dir_all(&dir).and_then(|_| std::fs::write(&path, &png))
                {
                    tracing::warn!(error = %e, path = %path.display(), "Failed to write debug frame");
                }
            }
            Ok(png)
        })
        .await
        .map_err(|e| PathreplayError::estimator(format!("Annotation task failed: {e}")))??;

        tracing::debug!(client = %self.client.name(), bytes = png.len(), "Querying estimator");
        let answer = self.client.query(&png, &self.prompt).await?;
        let parsed = response::parse_coordinates(&answer);
        if parsed.is_none() {
            tracing::debug!(answer = %answer.trim(), "Unparsable estimator answer");
        }
        Ok(parsed)
    }
}

/// One pointer observation handed to the estimator.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Offset of the primary sample this frame belongs to.
    pub offset_ms: u64,
    /// True pointer position in logical space.
    pub truth: Point,
    /// Frame captured on the same tick, in physical space.
    pub frame: Frame,
}

/// Outcome of one estimate, compared with the truth.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateReport {
    pub offset_ms: u64,
    pub truth_unit: Point,
    /// `None` when the call failed, timed out or was unparsable.
    pub estimate_unit: Option<Point>,
    /// Distance between estimate and truth in logical units.
    pub drift_logical: Option<f64>,
}

/// Counters kept by [`EstimatorDispatch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub submitted: u64,
    pub abandoned: u64,
}

/// Runs estimates in the background, one outstanding call at a time.
pub struct EstimatorDispatch {
    estimator: Arc<CursorEstimator>,
    geometry: ScreenGeometry,
    timeout: Duration,
    reports: Option<mpsc::UnboundedSender<EstimateReport>>,
    outstanding: Option<JoinHandle<()>>,
    stats: DispatchStats,
}

impl EstimatorDispatch {
    pub fn new(estimator: Arc<CursorEstimator>, geometry: ScreenGeometry, timeout: Duration) -> Self {
        Self {
            estimator,
            geometry,
            timeout,
            reports: None,
            outstanding: None,
            stats: DispatchStats::default(),
        }
    }

    /// Forward every completed estimate to `sender`.
    pub fn with_reports(mut self, sender: mpsc::UnboundedSender<EstimateReport>) -> Self {
        self.reports = Some(sender);
        self
    }

    /// Start an estimate for `observation`, abandoning any call still running.
    ///
    /// Must be called from within a tokio runtime. Never blocks.
    pub fn submit(&mut self, observation: Observation) {
        self.abandon_outstanding();
        self.stats.submitted += 1;

        let estimator = self.estimator.clone();
        let geometry = self.geometry;
        let timeout = self.timeout;
        let reports = self.reports.clone();

        self.outstanding = Some(tokio::spawn(async move {
            let report = run_estimate(&estimator, geometry, timeout, observation).await;
            if let Some(sender) = reports {
                let _ = sender.send(report);
            }
        }));
    }

    /// Abandon the outstanding call, if any, and return the counters.
    pub fn shutdown(&mut self) -> DispatchStats {
        self.abandon_outstanding();
        self.stats
    }

    /// Called at the start of every sampling tick, whether or not the tick
    /// goes on to submit. A call still running from an earlier tick is
    /// aborted and its result never delivered.
    pub fn on_tick(&mut self) {
        self.abandon_outstanding();
    }

    fn abandon_outstanding(&mut self) {
        if let Some(handle) = self.outstanding.take() {
            if !handle.is_finished() {
                handle.abort();
                self.stats.abandoned += 1;
                tracing::debug!("Abandoned outstanding estimate");
            }
        }
    }
}

impl Drop for EstimatorDispatch {
    fn drop(&mut self) {
        if let Some(handle) = self.outstanding.take() {
            handle.abort();
        }
    }
}

async fn run_estimate(
    estimator: &CursorEstimator,
    geometry: ScreenGeometry,
    timeout: Duration,
    observation: Observation,
) -> EstimateReport {
    let Observation {
        offset_ms,
        truth,
        frame,
    } = observation;

    let frame_extent = frame_size(&frame);
    let truth_unit = geometry.to_unit(truth, CoordinateSpace::Logical);
    let hint = Point::new(
        truth_unit.x * frame_extent.width as f64,
        truth_unit.y * frame_extent.height as f64,
    );

    let estimate = match tokio::time::timeout(timeout, estimator.estimate(frame, hint)).await {
        Ok(Ok(Some(point))) => Some(point),
        Ok(Ok(None)) => {
            tracing::warn!(offset_ms, "Estimator returned no usable coordinates");
            None
        }
        Ok(Err(e)) => {
            tracing::warn!(offset_ms, error = %e, "Estimator call failed");
            None
        }
        Err(_) => {
            tracing::warn!(offset_ms, timeout_ms = timeout.as_millis() as u64, "Estimator call timed out");
            None
        }
    };

    let estimate_unit = estimate.map(|p| unit_from_frame(p, frame_extent));
    let drift_logical = estimate_unit.map(|unit| {
        geometry
            .from_unit(unit, CoordinateSpace::Logical)
            .distance_to(&truth)
    });

    if let (Some(unit), Some(drift)) = (estimate_unit, drift_logical) {
        tracing::info!(
            offset_ms,
            truth_x = truth_unit.x,
            truth_y = truth_unit.y,
            estimate_x = unit.x,
            estimate_y = unit.y,
            drift = drift,
            "Ground truth vs estimate"
        );
    }

    EstimateReport {
        offset_ms,
        truth_unit,
        estimate_unit,
        drift_logical,
    }
}
