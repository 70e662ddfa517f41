//! Render execution for Vertcut.
//!
//! Takes the graphs produced by the compiler and turns them into files:
//! assembling the ffmpeg invocation, running it as a child process,
//! parsing its progress stream into job updates, and keeping the job
//! registry that the HTTP surface and CLI poll.

pub mod broadcast;
pub mod executor;
pub mod probe;
pub mod registry;
pub mod workspace;

pub use broadcast::{watch_job, ProgressEvent};
pub use executor::{build_ffmpeg_args, run_render, OutputProfile};
pub use probe::{probe_media, MediaProbe};
pub use registry::{InMemoryJobStore, JobStore};
pub use workspace::JobWorkspace;
