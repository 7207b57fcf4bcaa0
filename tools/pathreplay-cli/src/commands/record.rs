//! Record a pointer trace.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use pathreplay_common::clock::RecordingClock;
use pathreplay_common::config::AppConfig;
use pathreplay_estimator::{CursorEstimator, EstimateReport, EstimatorDispatch, GeminiClient};
use pathreplay_platform_core::CoordinateSpace;
use pathreplay_platform_linux::{CommandFrameSource, XdotoolPointer};
use pathreplay_recorder::{Sampler, SamplerConfig, SamplerState, TraceWriter};
use tokio::sync::mpsc;

pub struct RecordArgs {
    pub duration_ms: Option<u64>,
    pub period_ms: Option<u64>,
    pub space: Option<CoordinateSpace>,
    pub output: Option<PathBuf>,
    pub estimate: bool,
    pub debug_frames: Option<PathBuf>,
}

pub async fn run(config: &AppConfig, args: RecordArgs) -> anyhow::Result<()> {
    let mut defaults = config.recording.clone();
    if let Some(duration_ms) = args.duration_ms {
        defaults.duration_ms = duration_ms;
    }
    if let Some(period_ms) = args.period_ms {
        defaults.period_ms = period_ms;
    }
    if let Some(output) = args.output {
        defaults.output = output;
    }
    defaults.validate()?;

    let space = match args.space {
        Some(space) => space,
        None => defaults.coordinate_space.parse()?,
    };

    let mut estimator_config = config.estimator.clone();
    estimator_config.enabled |= args.estimate;
    if args.debug_frames.is_some() {
        estimator_config.debug_frames_dir = args.debug_frames;
    }

    // Everything fatal happens before the first tick.
    super::require_display()?;
    let mut frames = CommandFrameSource::new(config.platform.screenshot_command.clone())?;
    let need_physical = estimator_config.enabled || space == CoordinateSpace::Physical;
    let geometry = super::resolve_geometry(&mut frames, need_physical)
        .context("Failed to resolve screen geometry")?;

    let mut estimates = None;
    let dispatch = if estimator_config.enabled {
        let client = GeminiClient::from_config(&estimator_config)?;
        let estimator = CursorEstimator::new(Arc::new(client))
            .with_debug_dir(estimator_config.debug_frames_dir.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        estimates = Some(tokio::spawn(collect_estimates(rx)));
        Some(
            EstimatorDispatch::new(
                Arc::new(estimator),
                geometry,
                Duration::from_millis(estimator_config.timeout_ms),
            )
            .with_reports(tx),
        )
    } else {
        None
    };

    let sampler_config = SamplerConfig {
        period: Duration::from_millis(defaults.period_ms),
        duration: Duration::from_millis(defaults.duration_ms),
        space,
        geometry,
    };

    let mut sampler = Sampler::new(sampler_config, Box::new(XdotoolPointer::new()))?;
    if let Some(dispatch) = dispatch {
        sampler = sampler.with_estimator(Box::new(frames), dispatch);
    }

    let clock = RecordingClock::start();
    let writer = TraceWriter::open(&defaults.output, &sampler_config.header(&clock))
        .with_context(|| format!("Failed to open {}", defaults.output.display()))?;

    println!("Recording pointer to: {}", defaults.output.display());
    println!(
        "  Duration: {}ms, period: {}ms, space: {space}",
        defaults.duration_ms, defaults.period_ms
    );
    println!("  Display: {} logical, {} physical", geometry.logical, geometry.physical);
    println!("  Estimator: {}", if estimator_config.enabled { "on" } else { "off" });
    println!();
    println!("Press Ctrl+C to stop early...");
    println!();

    let report = sampler
        .run(&clock, writer, super::cancel_on_ctrl_c())
        .await?;
    drop(sampler);

    match report.state {
        SamplerState::Cancelled => println!("Recording stopped early."),
        _ => println!("Recording finished."),
    }
    println!("  Samples written: {}", report.samples_written);
    println!("  Skipped ticks: {}", report.skipped_ticks);
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());

    if let Some(collector) = estimates {
        let drifts = collector.await?;
        println!(
            "  Estimates: {} submitted, {} abandoned, {} answered",
            report.estimates.submitted,
            report.estimates.abandoned,
            drifts.len()
        );
        if !drifts.is_empty() {
            let mean = drifts.iter().sum::<f64>() / drifts.len() as f64;
            let worst = drifts.iter().copied().fold(0.0, f64::max);
            println!("  Estimate drift: mean {mean:.1}, worst {worst:.1} (logical units)");
        }
    }

    println!("Trace saved to: {}", defaults.output.display());
    Ok(())
}

async fn collect_estimates(mut rx: mpsc::UnboundedReceiver<EstimateReport>) -> Vec<f64> {
    let mut drifts = Vec::new();
    while let Some(report) = rx.recv().await {
        if let Some(drift) = report.drift_logical {
            drifts.push(drift);
        }
    }
    drifts
}
