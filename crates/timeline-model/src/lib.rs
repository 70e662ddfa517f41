//! Vertcut Timeline Model
//!
//! Defines the core data contracts for Vertcut renders:
//! - **Media:** Resolved source files with probed duration and stream info
//! - **Clips:** Trimmed, positioned references to media with transitions,
//!   color grading, reframe keyframes, and volume settings
//! - **Timeline:** Ordered tracks of clips plus the chosen layout
//! - **Jobs:** Lifecycle state of asynchronous render work
//!
//! All time values are seconds as `f64`. This crate is pure data — no I/O,
//! no process handling. Validation of compiler input lives here so both
//! the HTTP surface and the CLI reject malformed timelines identically.

pub mod clip;
pub mod job;
pub mod media;
pub mod timeline;
pub mod track;

pub use clip::*;
pub use job::*;
pub use media::*;
pub use timeline::*;
pub use track::*;

/// Error produced by timeline validation.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid clip: {0}")]
    InvalidClip(String),

    #[error("Clips overlap on track: {0}")]
    OverlappingClips(String),

    #[error("Unknown media source: {0}")]
    UnknownSource(String),

    #[error("Unsupported layout: {0}")]
    UnsupportedLayout(String),

    #[error("Timeline has no video clips")]
    EmptyTimeline,
}
