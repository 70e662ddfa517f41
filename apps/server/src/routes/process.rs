//! Speed-change jobs.

use axum::extract::{Multipart, State};
use axum::Json;
use vertcut_common::VertcutError;
use vertcut_export_compiler::{compile_retime, RetimeParams};
use vertcut_render_engine::{probe_media, registry, run_render, JobWorkspace, OutputProfile};
use vertcut_timeline_model::Job;

use crate::error::{bad_multipart, ApiError};
use crate::state::AppState;

/// `POST /process-video` — multipart `video` + `fps` + `speed`.
///
/// Input problems (missing part, bad numbers, undecodable upload) are
/// rejected synchronously before a job id exists; once the id is
/// returned, failures surface only through the job's error field.
pub async fn process_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut video: Option<(String, Vec<u8>)> = None;
    let mut fps = state.config.render.fps;
    let mut speed = 1.0f64;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name().unwrap_or("") {
            "video" => {
                let file_name = field.file_name().unwrap_or("input.mp4").to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                video = Some((file_name, bytes.to_vec()));
            }
            "fps" => {
                let text = field.text().await.map_err(bad_multipart)?;
                fps = text.trim().parse().map_err(|_| {
                    ApiError(VertcutError::validation(format!("invalid fps: {text}")))
                })?;
            }
            "speed" => {
                let text = field.text().await.map_err(bad_multipart)?;
                speed = text.trim().parse().map_err(|_| {
                    ApiError(VertcutError::validation(format!("invalid speed: {text}")))
                })?;
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    let (file_name, bytes) = video
        .ok_or_else(|| ApiError(VertcutError::validation("missing `video` multipart field")))?;

    let job_id = registry::new_job_id();
    let workspace = JobWorkspace::create(&state.config.work_dir, &job_id).await?;
    let input_path = workspace.input_path(&file_name);
    tokio::fs::write(&input_path, &bytes).await?;

    // Probe and compile up front so bad input never becomes a job. The
    // workspace drop guard cleans up on any early return.
    let probe = probe_media(&input_path).await?;
    let params = RetimeParams { fps, speed };
    let graph = compile_retime(&input_path, &params, probe.duration_secs, probe.has_audio)?;

    let output_path = state.output_path(&format!("{job_id}.{}", OutputProfile::Final.extension()));
    state.store.insert(Job::new(&job_id))?;
    tracing::info!(job_id, speed, fps, "Accepted process-video job");

    let store = state.store.clone();
    let task_id = job_id.clone();
    tokio::spawn(async move {
        let _ = run_render(
            store.as_ref(),
            &task_id,
            &graph,
            OutputProfile::Final,
            fps,
            &output_path,
        )
        .await;
        workspace.remove().await;
    });

    Ok(Json(serde_json::json!({ "jobId": job_id })))
}
