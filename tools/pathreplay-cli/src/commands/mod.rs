pub mod check;
pub mod info;
pub mod play;
pub mod record;

use pathreplay_common::error::{PathreplayError, PathreplayResult};
use pathreplay_platform_core::{FrameSource, ScreenGeometry};
use pathreplay_platform_linux::{detect_display_server, DisplayServer, LinuxProbe};
use tokio_util::sync::CancellationToken;

/// Fail early when there is no display for `xdotool` to talk to.
pub fn require_display() -> PathreplayResult<()> {
    match detect_display_server() {
        DisplayServer::X11 => Ok(()),
        DisplayServer::Wayland => {
            tracing::warn!("Wayland session detected, pointer I/O only reaches XWayland clients");
            Ok(())
        }
        DisplayServer::Unknown => Err(PathreplayError::unsupported(
            "no display detected; set DISPLAY to a running X server",
        )),
    }
}

/// Resolve the current display's geometry.
///
/// `need_physical` makes a failed probe capture fatal; otherwise the
/// display is assumed unscaled.
pub fn resolve_geometry(
    frames: &mut dyn FrameSource,
    need_physical: bool,
) -> PathreplayResult<ScreenGeometry> {
    let mut probe = LinuxProbe::new(frames).with_unscaled_fallback(!need_physical);
    ScreenGeometry::resolve(&mut probe)
}

/// A token cancelled on the first Ctrl+C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping");
            trigger.cancel();
        }
    });
    cancel
}
