//! Media probing via ffprobe.

use std::path::Path;

use tokio::process::Command;
use vertcut_common::{VertcutError, VertcutResult};
use vertcut_timeline_model::MediaKind;

/// Probed properties of an uploaded media file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaProbe {
    pub kind: MediaKind,
    pub duration_secs: Option<f64>,
    pub has_audio: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Probe a media file with ffprobe.
///
/// Stills report no duration; a video without an audio stream reports
/// `has_audio: false` so the compiler can synthesize silence for it.
pub async fn probe_media(path: &Path) -> VertcutResult<MediaProbe> {
    if !path.exists() {
        return Err(VertcutError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| VertcutError::probe(format!("Failed to run ffprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VertcutError::probe(format!(
            "ffprobe failed for {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    parse_probe_output(&raw)
}

fn parse_probe_output(raw: &str) -> VertcutResult<MediaProbe> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| VertcutError::probe(format!("Unparseable ffprobe output: {e}")))?;

    let streams = value["streams"]
        .as_array()
        .ok_or_else(|| VertcutError::probe("ffprobe output has no streams"))?;

    let mut has_video = false;
    let mut has_audio = false;
    let mut width = None;
    let mut height = None;
    let mut video_duration: Option<f64> = None;

    for stream in streams {
        match stream["codec_type"].as_str() {
            Some("video") => {
                has_video = true;
                width = width.or_else(|| stream["width"].as_u64().map(|w| w as u32));
                height = height.or_else(|| stream["height"].as_u64().map(|h| h as u32));
                video_duration = video_duration
                    .or_else(|| stream["duration"].as_str().and_then(|d| d.parse().ok()));
            }
            Some("audio") => has_audio = true,
            _ => {}
        }
    }

    let format_duration: Option<f64> = value["format"]["duration"]
        .as_str()
        .and_then(|d| d.parse().ok());
    let duration_secs = format_duration.or(video_duration).filter(|d| *d > 0.0);

    // A video stream with no duration is a still image (png/jpeg decode
    // as single-frame video).
    let kind = if has_video && duration_secs.is_some() {
        MediaKind::Video
    } else if has_video {
        MediaKind::Image
    } else if has_audio {
        MediaKind::Audio
    } else {
        return Err(VertcutError::probe(
            "File contains neither video nor audio streams",
        ));
    };

    Ok(MediaProbe {
        kind,
        duration_secs,
        has_audio,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_with_audio_is_parsed() {
        let raw = r#"{
            "streams": [
                {"codec_type": "video", "width": 1920, "height": 1080, "duration": "12.5"},
                {"codec_type": "audio"}
            ],
            "format": {"duration": "12.504000"}
        }"#;
        let probe = parse_probe_output(raw).unwrap();
        assert_eq!(probe.kind, MediaKind::Video);
        assert!(probe.has_audio);
        assert_eq!(probe.width, Some(1920));
        assert_eq!(probe.height, Some(1080));
        assert!((probe.duration_secs.unwrap() - 12.504).abs() < 1e-9);
    }

    #[test]
    fn silent_video_reports_no_audio() {
        let raw = r#"{
            "streams": [{"codec_type": "video", "width": 640, "height": 480, "duration": "3.0"}],
            "format": {"duration": "3.000000"}
        }"#;
        let probe = parse_probe_output(raw).unwrap();
        assert_eq!(probe.kind, MediaKind::Video);
        assert!(!probe.has_audio);
    }

    #[test]
    fn still_image_has_no_duration() {
        let raw = r#"{
            "streams": [{"codec_type": "video", "width": 800, "height": 600}],
            "format": {}
        }"#;
        let probe = parse_probe_output(raw).unwrap();
        assert_eq!(probe.kind, MediaKind::Image);
        assert_eq!(probe.duration_secs, None);
    }

    #[test]
    fn audio_only_file_is_audio_kind() {
        let raw = r#"{
            "streams": [{"codec_type": "audio"}],
            "format": {"duration": "180.2"}
        }"#;
        let probe = parse_probe_output(raw).unwrap();
        assert_eq!(probe.kind, MediaKind::Audio);
        assert!(probe.has_audio);
    }

    #[test]
    fn streamless_file_is_rejected() {
        let raw = r#"{"streams": [], "format": {}}"#;
        assert!(parse_probe_output(raw).is_err());
    }
}
