//! Render a timeline locally.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use vertcut_export_compiler::{compile, RenderParams};
use vertcut_render_engine::{
    probe_media, registry, run_render, watch_job, InMemoryJobStore, JobStore, OutputProfile,
};
use vertcut_timeline_model::{Job, JobStatus, MediaIndex, MediaSource, Timeline};

pub async fn run(
    timeline_path: PathBuf,
    media_specs: Vec<String>,
    output: PathBuf,
    intermediate: bool,
) -> anyhow::Result<()> {
    let timeline: Timeline = serde_json::from_str(&std::fs::read_to_string(&timeline_path)?)
        .map_err(|e| anyhow::anyhow!("Failed to parse timeline: {e}"))?;

    let mut media = MediaIndex::new();
    for spec in &media_specs {
        let (id, path) = parse_media_spec(spec)?;
        let probe = probe_media(&path).await?;
        media.insert(MediaSource {
            id,
            path,
            kind: probe.kind,
            duration_secs: probe.duration_secs,
            has_audio: probe.has_audio,
        });
    }

    let params = RenderParams::default();
    let graph = compile(&timeline, &media, &params)?;
    let profile = if intermediate {
        OutputProfile::Intermediate
    } else {
        OutputProfile::Final
    };

    println!("Rendering to: {}", output.display());
    println!("Expected duration: {:.3}s", graph.expected_duration_secs);

    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    let job_id = registry::new_job_id();
    store.insert(Job::new(&job_id))?;

    let mut progress = watch_job(store.clone(), job_id.clone(), Duration::from_millis(250));

    let render_store = store.clone();
    let render_id = job_id.clone();
    let render_output = output.clone();
    let fps = params.fps;
    let render = tokio::spawn(async move {
        run_render(
            render_store.as_ref(),
            &render_id,
            &graph,
            profile,
            fps,
            &render_output,
        )
        .await
    });

    while let Some(event) = progress.recv().await {
        print!("\r  {:3}%", event.progress);
        std::io::stdout().flush().ok();
        if event.status == JobStatus::Error {
            println!();
            anyhow::bail!(
                "Render failed: {}",
                event.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }
    println!();

    render.await??;
    println!("Done: {}", output.display());
    Ok(())
}

fn parse_media_spec(spec: &str) -> anyhow::Result<(String, PathBuf)> {
    match spec.split_once('=') {
        Some((id, path)) if !id.is_empty() && !path.is_empty() => {
            Ok((id.to_string(), PathBuf::from(path)))
        }
        _ => Err(anyhow::anyhow!(
            "Invalid media spec '{spec}', expected id=path"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_spec_splits_on_first_equals() {
        let (id, path) = parse_media_spec("clip1=/tmp/a=b.mp4").unwrap();
        assert_eq!(id, "clip1");
        assert_eq!(path, PathBuf::from("/tmp/a=b.mp4"));
    }

    #[test]
    fn empty_sides_are_rejected() {
        assert!(parse_media_spec("=path").is_err());
        assert!(parse_media_spec("id=").is_err());
        assert!(parse_media_spec("noseparator").is_err());
    }
}
