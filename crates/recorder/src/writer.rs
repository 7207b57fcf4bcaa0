//! Append-only trace writer for crash-safe sample logging.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use pathreplay_common::error::{PathreplayError, PathreplayResult};
use pathreplay_platform_core::CoordinateSpace;
use pathreplay_trace_model::{column_line, format_row, header_line, OffsetMs, Sample, TraceHeader};

/// Writes samples to a trace file, flushing after every row.
///
/// The header and column row are written once, on open. A process killed
/// mid-run leaves every row appended before the kill readable.
pub struct TraceWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    space: CoordinateSpace,
    last_offset: Option<OffsetMs>,
    samples_written: u64,
}

impl TraceWriter {
    /// Create (or truncate) `path` and write the header.
    pub fn open(path: impl AsRef<Path>, header: &TraceHeader) -> PathreplayResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                PathreplayError::storage(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| {
                PathreplayError::storage(format!("Failed to open {}: {e}", path.display()))
            })?;

        let mut writer = BufWriter::new(file);
        let space = header.coordinate_space;

        writeln!(writer, "{}", header_line(header)?)
            .and_then(|_| writeln!(writer, "{}", column_line(space)))
            .and_then(|_| writer.flush())
            .map_err(|e| PathreplayError::storage(format!("Failed to write header: {e}")))?;

        tracing::debug!(path = %path.display(), space = %space, "Opened trace");

        Ok(Self {
            writer,
            path,
            space,
            last_offset: None,
            samples_written: 0,
        })
    }

    /// Append one sample and flush it.
    ///
    /// Offsets must strictly increase; a sample that does not is refused
    /// and nothing is written.
    pub fn append(&mut self, sample: &Sample) -> PathreplayResult<()> {
        if let Some(last) = self.last_offset {
            if sample.offset_ms <= last {
                return Err(PathreplayError::storage(format!(
                    "offset {} does not follow {last}",
                    sample.offset_ms
                )));
            }
        }

        writeln!(self.writer, "{}", format_row(sample, self.space))
            .and_then(|_| self.writer.flush())
            .map_err(|e| PathreplayError::storage(format!("Failed to append sample: {e}")))?;

        self.last_offset = Some(sample.offset_ms);
        self.samples_written += 1;
        Ok(())
    }

    /// Flush buffered writes to the OS.
    pub fn flush(&mut self) -> PathreplayResult<()> {
        self.writer
            .flush()
            .map_err(|e| PathreplayError::storage(format!("Failed to flush trace: {e}")))
    }

    /// Flush and sync to disk. The trace is complete once this returns.
    pub fn close(mut self) -> PathreplayResult<u64> {
        self.flush()?;
        self.writer
            .get_ref()
            .sync_all()
            .map_err(|e| PathreplayError::storage(format!("Failed to sync trace: {e}")))?;
        tracing::debug!(path = %self.path.display(), samples = self.samples_written, "Closed trace");
        Ok(self.samples_written)
    }

    /// Number of samples written.
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Space the trace is written in.
    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    /// Path to the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TraceWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
