//! Pointer I/O through the `xdotool` binary.

use std::process::Command;

use pathreplay_common::error::{PathreplayError, PathreplayResult};
use pathreplay_platform_core::{Point, PointerDevice, Size};

/// Pointer backed by `xdotool`. Coordinates are X11 root-window pixels,
/// which is the logical space on this backend.
#[derive(Debug, Default)]
pub struct XdotoolPointer;

impl XdotoolPointer {
    pub fn new() -> Self {
        Self
    }
}

impl PointerDevice for XdotoolPointer {
    fn position(&mut self) -> PathreplayResult<Point> {
        let stdout = run(&["getmouselocation", "--shell"])?;
        parse_mouse_location(&stdout).ok_or_else(|| {
            PathreplayError::pointer(format!(
                "unexpected getmouselocation output: '{}'",
                stdout.trim()
            ))
        })
    }

    fn move_to(&mut self, target: Point) -> PathreplayResult<()> {
        let (x, y) = target.rounded();
        run(&["mousemove", "--", &x.to_string(), &y.to_string()]).map(|_| ())
    }

    fn name(&self) -> &str {
        "xdotool"
    }
}

/// Run `xdotool` with `args` and return its stdout.
pub(crate) fn run(args: &[&str]) -> PathreplayResult<String> {
    let output = Command::new("xdotool")
        .args(args)
        .output()
        .map_err(|e| PathreplayError::pointer(format!("Failed to execute xdotool: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PathreplayError::pointer(format!(
            "xdotool {} exited with {}: {}",
            args.first().copied().unwrap_or_default(),
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `getmouselocation --shell` output (`X=..`, `Y=..` lines).
pub fn parse_mouse_location(stdout: &str) -> Option<Point> {
    let mut x = None;
    let mut y = None;

    for line in stdout.lines() {
        if let Some(val) = line.trim().strip_prefix("X=") {
            x = val.parse::<i64>().ok();
        } else if let Some(val) = line.trim().strip_prefix("Y=") {
            y = val.parse::<i64>().ok();
        }
    }

    Some(Point::new(x? as f64, y? as f64))
}

/// Parse `getdisplaygeometry` output (`W H`).
pub fn parse_display_geometry(stdout: &str) -> Option<Size> {
    let mut parts = stdout.split_whitespace();
    let width = parts.next()?.parse::<u32>().ok()?;
    let height = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Size::new(width, height))
}
