//! Vertcut Export Compiler
//!
//! Compiles a declarative multi-track timeline into a deterministic,
//! time-aligned ffmpeg filter graph:
//! - **Filter graph:** Typed chains with named streams, serialized to the
//!   `-filter_complex` syntax only at the boundary
//! - **Clip graphs:** Per-clip trim, reframe crop, normalization, color
//!   grading, and audio (or synthesized silence)
//! - **Transition folding:** Crossfades, dissolves, dips, and hard cuts
//!   with a running chain-end timestamp
//! - **Audio mixing:** Music/audio-track overlay with delay and volume
//! - **Retiming:** Frame-interpolated speed changes with tempo-corrected
//!   audio
//!
//! This crate is pure computation — no I/O, no process handling. All
//! inputs are data; all outputs are data. Compiling the same timeline
//! twice yields byte-identical graphs.

pub mod audio_mix;
pub mod clip_graph;
pub mod compile;
pub mod graph;
pub mod retime;
pub mod transition;

pub use compile::{compile, RenderGraph, RenderInput, RenderParams};
pub use graph::{Filter, FilterChain, FilterGraph, LabelAllocator};
pub use retime::{compile_retime, RetimeParams};
