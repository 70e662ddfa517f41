//! Artifact download.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use vertcut_common::VertcutError;
use vertcut_timeline_model::JobStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /download/:job_id` (and `/download-export/:job_id`).
///
/// 404 unless the job is `Done` and its artifact still exists on disk.
pub async fn download(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let job = state.store.get(&job_id)?;
    if job.status != JobStatus::Done {
        return Err(ApiError(VertcutError::job_not_found(&job_id)));
    }

    let path = job
        .output_path
        .filter(|p| p.exists())
        .ok_or_else(|| ApiError(VertcutError::job_not_found(&job_id)))?;

    let bytes = tokio::fs::read(&path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("output.mp4")
        .to_string();

    tracing::debug!(job_id, file = %file_name, bytes = bytes.len(), "Serving artifact");

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&file_name).to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{file_name}\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}

fn content_type_for(file_name: &str) -> &'static str {
    match std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
    {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type_for("a.mp4"), "video/mp4");
        assert_eq!(content_type_for("a.mov"), "video/quicktime");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
