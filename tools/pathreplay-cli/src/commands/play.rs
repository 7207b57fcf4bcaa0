//! Replay a trace on this display.

use std::path::PathBuf;

use anyhow::Context;
use pathreplay_common::config::AppConfig;
use pathreplay_platform_core::CoordinateSpace;
use pathreplay_platform_linux::{CommandFrameSource, XdotoolPointer};
use pathreplay_player::Player;
use pathreplay_trace_model::load_trace;

pub async fn run(
    config: &AppConfig,
    path: PathBuf,
    assume_space: Option<CoordinateSpace>,
) -> anyhow::Result<()> {
    let loaded = load_trace(&path, assume_space)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let recording = &loaded.recording;

    println!("Replaying: {}", path.display());
    println!(
        "  Samples: {} ({} skipped), space: {}, span: {:.1}s",
        recording.len(),
        loaded.diagnostics.len(),
        recording.space(),
        recording.span_ms() as f64 / 1000.0
    );

    super::require_display()?;
    let mut frames = CommandFrameSource::new(config.platform.screenshot_command.clone())?;
    let geometry = super::resolve_geometry(&mut frames, false)
        .context("Failed to resolve screen geometry")?;
    if let Some(recorded) = recording.header.geometry {
        if recorded != geometry {
            println!(
                "  Remapping from {} to {} logical",
                recorded.logical, geometry.logical
            );
        }
    }

    let mut player = Player::new(Box::new(XdotoolPointer::new()), geometry);
    let report = player.play(recording, super::cancel_on_ctrl_c()).await?;

    println!();
    if report.cancelled {
        println!("Playback stopped early.");
    } else {
        println!("Playback finished.");
    }
    println!(
        "  Moves: {} ({} failed)",
        report.moves_issued, report.move_failures
    );
    println!(
        "  Elapsed: {}ms vs {}ms recorded (drift {:+}ms, worst lateness {}ms)",
        report.drift.measured_ms,
        report.drift.reference_ms,
        report.drift.drift_ms(),
        report.max_lateness.as_millis()
    );

    Ok(())
}
