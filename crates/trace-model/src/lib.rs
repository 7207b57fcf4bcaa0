//! Pathreplay Trace Model
//!
//! Defines the data contracts shared by the recorder and the player:
//! - **Samples:** one timestamped pointer observation each
//! - **Header:** schema version, coordinate-space tag, recording geometry
//! - **Codec:** the durable line format and its tolerant loader
//!
//! A trace file is a `# {json header}` line, a column row, then one
//! `offset_ms,x,y` row per sample. Every position in one trace is in the
//! coordinate space named by its header.

pub mod codec;
pub mod header;
pub mod sample;

pub use codec::*;
pub use header::*;
pub use sample::*;
