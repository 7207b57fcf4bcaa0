//! Frame capture through an external screenshot command.

use std::process::Command;

use image::ImageFormat;
use pathreplay_common::error::{PathreplayError, PathreplayResult};
use pathreplay_platform_core::{Frame, FrameSource};

/// Runs a shell command that writes a PNG of the whole display to stdout
/// and decodes it into a frame.
#[derive(Debug, Clone)]
pub struct CommandFrameSource {
    command: String,
}

impl CommandFrameSource {
    pub fn new(command: impl Into<String>) -> PathreplayResult<Self> {
        let command = command.into();
        if command.trim().is_empty() {
            return Err(PathreplayError::config("screenshot command is empty"));
        }
        Ok(Self { command })
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl FrameSource for CommandFrameSource {
    fn capture(&mut self) -> PathreplayResult<Frame> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .output()
            .map_err(|e| PathreplayError::capture(format!("Failed to run '{}': {e}", self.command)))?;

        if !output.status.success() {
            return Err(PathreplayError::capture(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        decode_png(&output.stdout)
    }

    fn name(&self) -> &str {
        "command"
    }
}

/// Decode PNG bytes into an RGBA frame.
pub fn decode_png(bytes: &[u8]) -> PathreplayResult<Frame> {
    if bytes.is_empty() {
        return Err(PathreplayError::capture("screenshot command produced no output"));
    }
    image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map(|img| img.to_rgba8())
        .map_err(|e| PathreplayError::capture(format!("Failed to decode screenshot: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn decodes_png_frames() {
        let img = RgbaImage::from_pixel(8, 4, Rgba([1, 2, 3, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let frame = decode_png(&bytes).unwrap();
        assert_eq!(frame.dimensions(), (8, 4));
        assert_eq!(frame.get_pixel(0, 0), &Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn garbage_is_a_capture_error() {
        assert!(matches!(
            decode_png(b"not a png"),
            Err(PathreplayError::Capture { .. })
        ));
        assert!(decode_png(&[]).is_err());
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(CommandFrameSource::new("  ").is_err());
    }

    #[test]
    fn failing_command_is_a_capture_error() {
        let mut source = CommandFrameSource::new("exit 3").unwrap();
        assert!(matches!(
            source.capture(),
            Err(PathreplayError::Capture { .. })
        ));
    }
}
