//! Pathreplay platform core contracts.
//!
//! This crate contains the coordinate-space model and the collaborator
//! contracts (pointer I/O, frame capture, display size probing) shared by
//! the recorder, estimator and player without coupling to a concrete OS
//! backend.
//!
//! Three spaces are in play:
//! - **Logical:** what the pointer I/O primitive addresses.
//! - **Physical:** pixels of a captured frame.
//! - **Unit:** `[0.0, 1.0]` relative to the display, resolution independent.

pub mod devices;
pub mod geometry;
pub mod space;
pub mod stub;

pub use devices::*;
pub use geometry::*;
pub use space::*;
