//! Show trace information.

use std::path::PathBuf;

use pathreplay_platform_core::CoordinateSpace;
use pathreplay_trace_model::load_trace;

pub fn run(path: PathBuf, assume_space: Option<CoordinateSpace>) -> anyhow::Result<()> {
    let loaded = load_trace(&path, assume_space)
        .map_err(|e| anyhow::anyhow!("Failed to load trace: {e}"))?;
    let recording = &loaded.recording;
    let header = &recording.header;

    println!("Trace: {}", path.display());
    println!("  Schema: {}", header.schema_version);
    if loaded.legacy {
        println!("  Legacy trace, space assumed");
    }
    println!("  Space: {}", header.coordinate_space);
    if !header.epoch_wall.is_empty() {
        println!("  Recorded: {}", header.epoch_wall);
    }
    if let Some(period_ms) = header.period_ms {
        println!("  Period: {period_ms}ms");
    }
    if let Some(geometry) = header.geometry {
        let (sx, sy) = geometry.scale();
        println!(
            "  Display: {} logical, {} physical (scale {sx:.2}x{sy:.2})",
            geometry.logical, geometry.physical
        );
    }
    println!();

    println!("Samples:");
    println!("  Count: {}", recording.len());
    println!("  Span: {:.3}s", recording.span_ms() as f64 / 1000.0);
    println!("  Last offset: {}ms", recording.last_offset_ms());
    println!("  Skipped rows: {}", loaded.diagnostics.len());
    for diag in loaded.diagnostics.iter().take(10) {
        println!("    line {}: {} ('{}')", diag.line, diag.defect, diag.content);
    }

    Ok(())
}
