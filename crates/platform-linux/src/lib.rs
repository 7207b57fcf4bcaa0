//! Pathreplay Linux Platform Integration
//!
//! Collaborators backed by stock X11 tooling:
//! - **Pointer:** `xdotool getmouselocation` / `mousemove`
//! - **Frames:** any shell command that writes a PNG of the display to stdout
//! - **Geometry:** `xdotool getdisplaygeometry` plus one probe capture
//! - **Capabilities:** tool detection and user guidance

pub mod display;
pub mod permissions;
pub mod screenshot;
pub mod xdotool;

pub use display::*;
pub use screenshot::CommandFrameSource;
pub use xdotool::XdotoolPointer;
