//! ffmpeg job execution.
//!
//! Assembles the command line for a compiled graph, runs ffmpeg as a
//! child process, and feeds its machine-readable progress stream into
//! the job store. Progress is clamped below 100 while the encoder runs;
//! 100 is written only after the process exits successfully and the
//! output file exists.

use std::path::Path;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use vertcut_common::{VertcutError, VertcutResult};
use vertcut_export_compiler::RenderGraph;
use vertcut_timeline_model::JobStatus;

use crate::registry::JobStore;

/// Encoding target for a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputProfile {
    /// Delivery encode: H.264 high profile with AAC audio, faststart
    /// for progressive playback.
    Final,

    /// Mathematically lossless intermediate for downstream editing,
    /// 10-bit 4:2:2 with uncompressed audio in a QuickTime container.
    Intermediate,
}

impl OutputProfile {
    pub fn extension(self) -> &'static str {
        match self {
            OutputProfile::Final => "mp4",
            OutputProfile::Intermediate => "mov",
        }
    }

    fn codec_args(self) -> Vec<String> {
        match self {
            OutputProfile::Final => vec![
                "-c:v".to_string(),
                "libx264".to_string(),
                "-preset".to_string(),
                "medium".to_string(),
                "-profile:v".to_string(),
                "high".to_string(),
                "-pix_fmt".to_string(),
                "yuv420p".to_string(),
                "-c:a".to_string(),
                "aac".to_string(),
                "-b:a".to_string(),
                "192k".to_string(),
                "-movflags".to_string(),
                "+faststart".to_string(),
            ],
            OutputProfile::Intermediate => vec![
                "-c:v".to_string(),
                "libx264".to_string(),
                "-preset".to_string(),
                "ultrafast".to_string(),
                "-qp".to_string(),
                "0".to_string(),
                "-pix_fmt".to_string(),
                "yuv422p10le".to_string(),
                "-c:a".to_string(),
                "pcm_s16le".to_string(),
            ],
        }
    }
}

/// Assemble the full ffmpeg argument list for a compiled graph.
pub fn build_ffmpeg_args(
    graph: &RenderGraph,
    profile: OutputProfile,
    fps: u32,
    output_path: &Path,
) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-nostats".to_string(),
        "-progress".to_string(),
        "pipe:1".to_string(),
    ];

    for input in &graph.inputs {
        if input.loop_still {
            args.push("-loop".to_string());
            args.push("1".to_string());
        }
        if let Some(limit) = input.limit_secs {
            args.push("-t".to_string());
            args.push(format!("{limit:.6}"));
        }
        args.push("-i".to_string());
        args.push(input.path.display().to_string());
    }

    args.push("-filter_complex".to_string());
    args.push(graph.filter_complex.clone());
    args.push("-map".to_string());
    args.push(format!("[{}]", graph.video_out));
    args.push("-map".to_string());
    args.push(format!("[{}]", graph.audio_out));
    args.push("-r".to_string());
    args.push(fps.to_string());

    args.extend(profile.codec_args());
    args.push(output_path.display().to_string());
    args
}

/// Accumulated state of ffmpeg's `-progress` key/value stream.
#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    ended: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // Both keys carry microseconds; out_time_ms is misnamed in
            // ffmpeg's output.
            "out_time_us" | "out_time_ms" => {
                if let Ok(us) = value.trim().parse::<i64>() {
                    self.out_time_secs = self.out_time_secs.max(us as f64 / 1_000_000.0);
                }
            }
            "progress" => {
                if value.trim() == "end" {
                    self.ended = true;
                }
            }
            _ => {}
        }
    }
}

/// Running percentage, clamped to `[0, 99]`.
///
/// 100 is reserved for the `Done` transition so a subscriber never sees
/// a full bar for a job that may still fail at finalization.
fn running_percent(out_time_secs: f64, expected_duration_secs: f64) -> u8 {
    if expected_duration_secs <= 0.0 {
        return 0;
    }
    let pct = (out_time_secs / expected_duration_secs * 100.0).floor();
    pct.clamp(0.0, 99.0) as u8
}

fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

/// Run a compiled graph to completion, reporting progress into `store`.
///
/// On failure the partial output file is removed and the job transitions
/// to `Error` with the tail of ffmpeg's stderr as the message.
pub async fn run_render(
    store: &dyn JobStore,
    job_id: &str,
    graph: &RenderGraph,
    profile: OutputProfile,
    fps: u32,
    output_path: &Path,
) -> VertcutResult<()> {
    let result = drive_ffmpeg(store, job_id, graph, profile, fps, output_path).await;

    match &result {
        Ok(()) => {
            store.update(job_id, &mut |job| {
                job.status = JobStatus::Done;
                job.progress = 100;
                job.output_path = Some(output_path.to_path_buf());
            })?;
            tracing::info!(job_id, output = %output_path.display(), "Render finished");
        }
        Err(err) => {
            let message = err.to_string();
            if let Err(remove_err) = tokio::fs::remove_file(output_path).await {
                if remove_err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        job_id,
                        error = %remove_err,
                        path = %output_path.display(),
                        "Failed to remove partial output"
                    );
                }
            }
            store.update(job_id, &mut |job| {
                job.status = JobStatus::Error;
                job.error = Some(message.clone());
            })?;
            tracing::error!(job_id, error = %message, "Render failed");
        }
    }

    result
}

async fn drive_ffmpeg(
    store: &dyn JobStore,
    job_id: &str,
    graph: &RenderGraph,
    profile: OutputProfile,
    fps: u32,
    output_path: &Path,
) -> VertcutResult<()> {
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let args = build_ffmpeg_args(graph, profile, fps, output_path);
    tracing::debug!(job_id, args = ?args, "Running ffmpeg");

    let mut child = Command::new("ffmpeg")
        .args(&args)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .map_err(|e| VertcutError::render(format!("Failed to start ffmpeg: {e}")))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| VertcutError::render("Failed to capture ffmpeg stdout"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| VertcutError::render("Failed to capture ffmpeg stderr"))?;

    // Drain stderr concurrently so ffmpeg never blocks on a full pipe.
    let stderr_task = tokio::spawn(async move {
        let mut output = String::new();
        match stderr.read_to_string(&mut output).await {
            Ok(_) => output,
            Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
        }
    });

    let expected = graph.expected_duration_secs;
    let mut state = ProgressState::default();
    let mut last_reported = 0u8;
    let mut lines = BufReader::new(stdout).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| VertcutError::render(format!("Failed reading ffmpeg progress: {e}")))?
    {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        state.update(key, value);
        if key == "progress" {
            let pct = running_percent(state.out_time_secs, expected);
            if pct != last_reported {
                last_reported = pct;
                store.update(job_id, &mut |job| {
                    job.progress = pct;
                })?;
            }
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|e| VertcutError::render(format!("Failed to wait on ffmpeg: {e}")))?;

    let stderr_output = stderr_task
        .await
        .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

    if !status.success() {
        return Err(VertcutError::render(format!(
            "ffmpeg exited with {}: {}",
            status,
            stderr_tail(&stderr_output, 20)
        )));
    }

    if !state.ended {
        tracing::warn!(job_id, "ffmpeg exited cleanly without a progress=end record");
    }

    if !output_path.exists() {
        return Err(VertcutError::render(format!(
            "ffmpeg reported success but produced no output at {}",
            output_path.display()
        )));
    }

    Ok(())
}
