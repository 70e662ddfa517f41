//! Timeline export jobs.

use std::path::Path;

use axum::extract::{Multipart, State};
use axum::Json;
use vertcut_common::VertcutError;
use vertcut_export_compiler::compile;
use vertcut_render_engine::{probe_media, registry, run_render, JobWorkspace, OutputProfile};
use vertcut_timeline_model::{Job, MediaIndex, MediaSource, Timeline};

use crate::error::{bad_multipart, ApiError};
use crate::state::AppState;

/// `POST /export` — multipart `timeline` JSON plus one file part per
/// media source, keyed by the source id the clips reference. Optional
/// `filename` names the artifact.
///
/// The timeline is compiled before the job id is issued, so layout and
/// resolution errors come back as synchronous 400s.
pub async fn export(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let job_id = registry::new_job_id();
    let workspace = JobWorkspace::create(&state.config.work_dir, &job_id).await?;

    let mut timeline: Option<Timeline> = None;
    let mut filename: Option<String> = None;
    let mut uploads: Vec<(String, std::path::PathBuf)> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "timeline" => {
                let text = field.text().await.map_err(bad_multipart)?;
                let parsed: Timeline = serde_json::from_str(&text).map_err(|e| {
                    ApiError(VertcutError::validation(format!("invalid timeline: {e}")))
                })?;
                timeline = Some(parsed);
            }
            "filename" => {
                filename = Some(field.text().await.map_err(bad_multipart)?);
            }
            "" => {
                return Err(ApiError(VertcutError::validation(
                    "multipart field without a name",
                )));
            }
            source_id => {
                // Keep the uploaded extension so the demuxer can sniff
                // the container.
                let ext = field
                    .file_name()
                    .and_then(|n| Path::new(n).extension())
                    .and_then(|e| e.to_str())
                    .map(|e| format!(".{e}"))
                    .unwrap_or_default();
                let dest = workspace.input_path(&format!("{source_id}{ext}"));
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                tokio::fs::write(&dest, &bytes).await?;
                uploads.push((source_id.to_string(), dest));
            }
        }
    }

    let timeline = timeline
        .ok_or_else(|| ApiError(VertcutError::validation("missing `timeline` multipart field")))?;

    let mut media = MediaIndex::new();
    for (id, path) in &uploads {
        let probe = probe_media(path).await?;
        media.insert(MediaSource {
            id: id.clone(),
            path: path.clone(),
            kind: probe.kind,
            duration_secs: probe.duration_secs,
            has_audio: probe.has_audio,
        });
    }

    let params = state.render_params();
    let graph = compile(&timeline, &media, &params)?;

    let output_path = state.output_path(&artifact_name(&job_id, filename.as_deref()));
    state.store.insert(Job::new(&job_id))?;
    tracing::info!(
        job_id,
        clips = timeline
            .primary_video_track()
            .map(|t| t.clips.len())
            .unwrap_or(0),
        sources = uploads.len(),
        duration = graph.expected_duration_secs,
        "Accepted export job"
    );

    let store = state.store.clone();
    let task_id = job_id.clone();
    let fps = params.fps;
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

    Ok(Json(serde_json::json!({ "exportId": job_id })))
}

/// Artifact file name: the caller's name when supplied (stripped of any
/// directory components, forced to the delivery extension), prefixed
/// with the job id to keep outputs collision-free.
fn artifact_name(job_id: &str, requested: Option<&str>) -> String {
    let ext = OutputProfile::Final.extension();
    match requested
        .map(Path::new)
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
    {
        Some(stem) => format!("{job_id}-{stem}.{ext}"),
        None => format!("{job_id}.{ext}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_name_defaults_to_job_id() {
        assert_eq!(artifact_name("abc", None), "abc.mp4");
        assert_eq!(artifact_name("abc", Some("")), "abc.mp4");
    }

    #[test]
    fn artifact_name_strips_directories_and_forces_extension() {
        assert_eq!(artifact_name("abc", Some("my-cut.mov")), "abc-my-cut.mp4");
        assert_eq!(
            artifact_name("abc", Some("../../etc/passwd")),
            "abc-passwd.mp4"
        );
    }
}
