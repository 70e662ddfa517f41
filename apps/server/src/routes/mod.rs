//! Route table.

pub mod cache;
pub mod download;
pub mod export;
pub mod process;
pub mod progress;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::state::AppState;

/// Uploads are raw video; the default 2 MiB body limit is far too low.
const MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/process-video", post(process::process_video))
        .route("/progress/:job_id", get(progress::job_progress))
        .route("/download/:job_id", get(download::download))
        .route("/export", post(export::export))
        .route("/export-progress/:job_id", get(progress::job_progress))
        .route("/download-export/:job_id", get(download::download))
        .route("/cache-status", get(cache::cache_status))
        .route("/clear-cache", post(cache::clear_cache))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
