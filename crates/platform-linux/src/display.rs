//! Display server detection and geometry probing.

use pathreplay_common::error::{PathreplayError, PathreplayResult};
use pathreplay_platform_core::{frame_size, FrameSource, GeometryProbe, Size};

use crate::xdotool;

/// Display server type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayServer {
    Wayland,
    X11,
    Unknown,
}

impl DisplayServer {
    /// Whether `xdotool` can drive the pointer on this server.
    pub fn supports_xdotool(&self) -> bool {
        // XWayland exposes DISPLAY too, but pointer reads there only see
        // X clients.
        matches!(self, Self::X11)
    }
}

/// Detect the current display server.
pub fn detect_display_server() -> DisplayServer {
    if std::env::var("WAYLAND_DISPLAY").is_ok() {
        DisplayServer::Wayland
    } else if std::env::var("DISPLAY").is_ok() {
        DisplayServer::X11
    } else {
        DisplayServer::Unknown
    }
}

/// Resolves the logical extent from `xdotool` and the physical extent from
/// one frame grabbed with the configured capture source.
pub struct LinuxProbe<'a> {
    frames: &'a mut dyn FrameSource,
    unscaled_fallback: bool,
}

impl<'a> LinuxProbe<'a> {
    pub fn new(frames: &'a mut dyn FrameSource) -> Self {
        Self {
            frames,
            unscaled_fallback: false,
        }
    }

    /// When the probe capture fails, report the logical extent as the
    /// physical one instead of failing. Only safe when nothing downstream
    /// depends on physical pixels.
    pub fn with_unscaled_fallback(mut self, enabled: bool) -> Self {
        self.unscaled_fallback = enabled;
        self
    }
}

impl GeometryProbe for LinuxProbe<'_> {
    fn logical_size(&mut self) -> PathreplayResult<Size> {
        let stdout = xdotool::run(&["getdisplaygeometry"])?;
        xdotool::parse_display_geometry(&stdout).ok_or_else(|| {
            PathreplayError::geometry(format!(
                "unexpected getdisplaygeometry output: '{}'",
                stdout.trim()
            ))
        })
    }

    fn physical_size(&mut self) -> PathreplayResult<Size> {
        match self.frames.capture() {
            Ok(frame) => Ok(frame_size(&frame)),
            Err(e) if self.unscaled_fallback => {
                tracing::warn!(error = %e, "Probe capture failed, assuming an unscaled display");
                self.logical_size()
            }
            Err(e) => Err(e),
        }
    }
}
