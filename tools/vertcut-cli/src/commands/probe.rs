//! Inspect a media file.

use std::path::PathBuf;

use vertcut_render_engine::probe_media;

pub async fn run(path: PathBuf, json: bool) -> anyhow::Result<()> {
    let probe = probe_media(&path).await?;

    if json {
        // Shaped as a media-source entry so the output can be collected
        // into a `compile --sources` file directly.
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("source")
            .to_string();
        let entry = serde_json::json!({
            "id": id,
            "path": path,
            "kind": probe.kind,
            "duration_secs": probe.duration_secs,
            "has_audio": probe.has_audio,
        });
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    println!("File: {}", path.display());
    println!("  Kind: {:?}", probe.kind);
    match probe.duration_secs {
        Some(d) => println!("  Duration: {d:.3}s"),
        None => println!("  Duration: (still image)"),
    }
    println!("  Audio stream: {}", if probe.has_audio { "yes" } else { "no" });
    if let (Some(w), Some(h)) = (probe.width, probe.height) {
        println!("  Dimensions: {w}x{h}");
    }

    Ok(())
}
