//! Shared server state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use vertcut_common::config::AppConfig;
use vertcut_export_compiler::RenderParams;
use vertcut_render_engine::{InMemoryJobStore, JobStore};

/// State handed to every handler. Cheap to clone; the job store is the
/// only shared mutable resource.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn JobStore>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(InMemoryJobStore::new()),
        }
    }

    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            width: self.config.render.width,
            height: self.config.render.height,
            fps: self.config.render.fps,
            audio_sample_rate: self.config.render.audio_sample_rate,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.render.progress_poll_ms)
    }

    /// Output artifact path for a job.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.config.output_dir.join(file_name)
    }
}
