//! Compile a timeline without touching ffmpeg.

use std::path::PathBuf;

use vertcut_export_compiler::{compile, RenderParams};
use vertcut_timeline_model::{MediaIndex, MediaSource, Timeline};

pub async fn run(timeline_path: PathBuf, sources_path: PathBuf, json: bool) -> anyhow::Result<()> {
    let timeline: Timeline = serde_json::from_str(&std::fs::read_to_string(&timeline_path)?)
        .map_err(|e| anyhow::anyhow!("Failed to parse timeline: {e}"))?;
    let sources: Vec<MediaSource> = serde_json::from_str(&std::fs::read_to_string(&sources_path)?)
        .map_err(|e| anyhow::anyhow!("Failed to parse sources: {e}"))?;

    let mut media = MediaIndex::new();
    for source in sources {
        media.insert(source);
    }

    let graph = compile(&timeline, &media, &RenderParams::default())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    println!("Inputs:");
    for (i, input) in graph.inputs.iter().enumerate() {
        let mut flags = String::new();
        if input.loop_still {
            flags.push_str(" (looped still");
            if let Some(limit) = input.limit_secs {
                flags.push_str(&format!(", {limit}s"));
            }
            flags.push(')');
        }
        println!("  [{i}] {}{flags}", input.path.display());
    }
    println!("Expected duration: {:.3}s", graph.expected_duration_secs);
    println!("Video out: [{}]  Audio out: [{}]", graph.video_out, graph.audio_out);
    println!("Filter graph:");
    for chain in graph.filter_complex.split(';') {
        println!("  {chain}");
    }

    Ok(())
}
