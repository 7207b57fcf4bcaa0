//! Durable line format for traces.
//!
//! ```text
//! # {"schema_version":"1.0","coordinate_space":"unit",...}
//! offset_ms,norm_x,norm_y
//! 0,0.50000000,0.25000000
//! ```
//!
//! Loading is tolerant per row and strict per file: a bad row is skipped
//! with a [`RowDiagnostic`], while a missing header, a column row that
//! contradicts the header, or a file with no usable rows fails the load.

use std::path::Path;

use pathreplay_common::error::{PathreplayError, PathreplayResult};
use pathreplay_platform_core::CoordinateSpace;

use crate::header::TraceHeader;
use crate::sample::{OffsetMs, Recording, Sample};

const HEADER_PREFIX: &str = "# ";
const OFFSET_COLUMN: &str = "offset_ms";
const LEGACY_OFFSET_COLUMNS: [&str; 2] = ["timestamp", "offset"];

/// Why a body row was skipped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowDefect {
    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),

    #[error("unparsable offset '{0}'")]
    Offset(String),

    #[error("unparsable coordinate '{0}'")]
    Coordinate(String),

    #[error("non-finite coordinate")]
    NonFinite,

    #[error("offset {offset} does not follow previous offset {previous}")]
    OutOfOrder { previous: OffsetMs, offset: OffsetMs },
}

/// A skipped row and the reason it was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDiagnostic {
    /// 1-based line number in the file.
    pub line: usize,
    /// The raw row.
    pub content: String,
    pub defect: RowDefect,
}

/// Result of loading a trace.
#[derive(Debug, Clone)]
pub struct LoadedTrace {
    pub recording: Recording,
    /// One entry per skipped row.
    pub diagnostics: Vec<RowDiagnostic>,
    /// The file had no header and was read with an assumed space.
    pub legacy: bool,
}

/// Serialize the header line.
pub fn header_line(header: &TraceHeader) -> PathreplayResult<String> {
    Ok(format!("{HEADER_PREFIX}{}", serde_json::to_string(header)?))
}

/// Column row naming the fields of a trace in `space`.
pub fn column_line(space: CoordinateSpace) -> String {
    let (x, y) = space.column_names();
    format!("{OFFSET_COLUMN},{x},{y}")
}

/// Serialize one body row.
pub fn format_row(sample: &Sample, space: CoordinateSpace) -> String {
    let precision = space.decimals();
    format!(
        "{},{:.*},{:.*}",
        sample.offset_ms, precision, sample.position.x, precision, sample.position.y
    )
}

/// Parse one body row into a sample.
pub fn parse_row(line: &str) -> Result<Sample, RowDefect> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(RowDefect::FieldCount(fields.len()));
    }

    let offset_ms = fields[0]
        .parse::<OffsetMs>()
        .map_err(|_| RowDefect::Offset(fields[0].to_string()))?;
    let x = parse_coordinate(fields[1])?;
    let y = parse_coordinate(fields[2])?;

    Ok(Sample::new(offset_ms, x, y))
}

fn parse_coordinate(field: &str) -> Result<f64, RowDefect> {
    let value = field
        .parse::<f64>()
        .map_err(|_| RowDefect::Coordinate(field.to_string()))?;
    if !value.is_finite() {
        return Err(RowDefect::NonFinite);
    }
    Ok(value)
}

/// Serialize a whole recording.
pub fn serialize_trace(recording: &Recording) -> PathreplayResult<String> {
    let space = recording.space();
    let mut output = header_line(&recording.header)?;
    output.push('\n');
    output.push_str(&column_line(space));
    output.push('\n');
    for sample in &recording.samples {
        output.push_str(&format_row(sample, space));
        output.push('\n');
    }
    Ok(output)
}

/// Parse a trace.
///
/// `assume` names the space of a header-less legacy file. It is never used
/// to reinterpret a file that carries its own header.
pub fn parse_trace(content: &str, assume: Option<CoordinateSpace>) -> PathreplayResult<LoadedTrace> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .peekable();

    let first = lines
        .peek()
        .copied()
        .ok_or_else(|| PathreplayError::malformed_log("trace is empty"))?;

    let (header, legacy) = if let Some(json) = first.1.strip_prefix('#') {
        lines.next();
        let header: TraceHeader = serde_json::from_str(json.trim()).map_err(|e| {
            PathreplayError::malformed_log(format!("unreadable header on line {}: {e}", first.0))
        })?;
        if let Some(assumed) = assume.filter(|a| *a != header.coordinate_space) {
            tracing::warn!(
                header = %header.coordinate_space,
                assumed = %assumed,
                "Trace declares its coordinate space; ignoring assumed space"
            );
        }
        (header, false)
    } else {
        let space = assume.ok_or_else(|| {
            PathreplayError::malformed_log(
                "trace has no header naming its coordinate space; \
                 pass an explicit space to read a legacy trace",
            )
        })?;
        tracing::warn!(space = %space, "Reading header-less legacy trace with assumed space");
        (TraceHeader::legacy(space), true)
    };

    if let Some(&(line_no, line)) = lines.peek() {
        if is_column_row(line) {
            lines.next();
            if !legacy && line != column_line(header.coordinate_space) {
                return Err(PathreplayError::malformed_log(format!(
                    "column row '{line}' on line {line_no} contradicts header space '{}'",
                    header.coordinate_space
                )));
            }
        }
    }

    let mut samples: Vec<Sample> = Vec::new();
    let mut diagnostics = Vec::new();

    for (line_no, line) in lines {
        let parsed = parse_row(line).and_then(|sample| match samples.last() {
            Some(prev) if sample.offset_ms <= prev.offset_ms => Err(RowDefect::OutOfOrder {
                previous: prev.offset_ms,
                offset: sample.offset_ms,
            }),
            _ => Ok(sample),
        });

        match parsed {
            Ok(sample) => samples.push(sample),
            Err(defect) => {
                tracing::warn!(line = line_no, row = %line, reason = %defect, "Skipping malformed row");
                diagnostics.push(RowDiagnostic {
                    line: line_no,
                    content: line.to_string(),
                    defect,
                });
            }
        }
    }

    let recording = Recording::new(header, samples)?;
    Ok(LoadedTrace {
        recording,
        diagnostics,
        legacy,
    })
}

/// Read and parse a trace file.
pub fn load_trace(path: &Path, assume: Option<CoordinateSpace>) -> PathreplayResult<LoadedTrace> {
    if !path.exists() {
        return Err(PathreplayError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_trace(&content, assume)
}

fn is_column_row(line: &str) -> bool {
    let first = line.split(',').next().unwrap_or("").trim();
    first == OFFSET_COLUMN || LEGACY_OFFSET_COLUMNS.contains(&first)
}
