//! Operational cache endpoints.
//!
//! `clear-cache` is destructive: it drops every job, workspace, and
//! output. Renders still running keep going; their store updates land
//! on missing keys and are dropped silently.

use std::path::Path;

use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /cache-status`.
pub async fn cache_status(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let transient = count_entries(&state.config.work_dir).await?;
    let outputs = count_entries(&state.config.output_dir).await?;
    Ok(Json(serde_json::json!({
        "jobs": state.store.count(),
        "transientEntries": transient,
        "outputFiles": outputs,
    })))
}

/// `POST /clear-cache`.
pub async fn clear_cache(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let transient = remove_entries(&state.config.work_dir).await?;
    let outputs = remove_entries(&state.config.output_dir).await?;
    let jobs = state.store.clear();

    tracing::info!(jobs, transient, outputs, "Cache cleared");
    Ok(Json(serde_json::json!({
        "clearedJobs": jobs,
        "clearedTransient": transient,
        "clearedOutputs": outputs,
    })))
}

async fn count_entries(dir: &Path) -> std::io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err),
    };
    let mut count = 0;
    while entries.next_entry().await?.is_some() {
        count += 1;
    }
    Ok(count)
}

async fn remove_entries(dir: &Path) -> std::io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err),
    };
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let result = if entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        match result {
            Ok(()) => removed += 1,
            Err(err) => {
                tracing::warn!(error = %err, path = %path.display(), "Failed to remove cache entry");
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch() -> PathBuf {
        std::env::temp_dir().join(format!("vertcut-cache-test-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn missing_directory_counts_zero() {
        let dir = scratch();
        assert_eq!(count_entries(&dir).await.unwrap(), 0);
        assert_eq!(remove_entries(&dir).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn remove_entries_clears_files_and_directories() {
        let dir = scratch();
        tokio::fs::create_dir_all(dir.join("job-1")).await.unwrap();
        tokio::fs::write(dir.join("job-1").join("in.mp4"), b"x")
            .await
            .unwrap();
        tokio::fs::write(dir.join("out.mp4"), b"y").await.unwrap();

        assert_eq!(count_entries(&dir).await.unwrap(), 2);
        assert_eq!(remove_entries(&dir).await.unwrap(), 2);
        assert_eq!(count_entries(&dir).await.unwrap(), 0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
