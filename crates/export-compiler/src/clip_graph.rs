//! Per-clip sub-graph construction.
//!
//! Each clip compiles to an isolated video sub-stream and audio
//! sub-stream. The stage order is fixed — trim, reframe crop, normalize,
//! color grade — because each stage assumes the previous stage's output
//! shape.

use vertcut_timeline_model::{Clip, MediaSource};

use crate::compile::RenderParams;
use crate::graph::{Filter, FilterGraph, LabelAllocator};

/// The named sub-streams produced for one clip.
#[derive(Debug, Clone)]
pub struct ClipStreams {
    pub video: String,
    pub audio: String,
    pub duration_secs: f64,
}

/// Build the video and audio sub-graphs for one clip.
///
/// `effective_volume` is the already-combined track and clip volume
/// (zero when either is muted).
pub fn build_clip_streams(
    graph: &mut FilterGraph,
    labels: &mut LabelAllocator,
    clip: &Clip,
    source: &MediaSource,
    input_index: usize,
    effective_volume: f64,
    params: &RenderParams,
) -> ClipStreams {
    let duration_secs = clip.duration_secs();
    let video = build_video_stream(graph, labels, clip, input_index, params);
    let audio = build_audio_stream(
        graph,
        labels,
        clip,
        source,
        input_index,
        effective_volume,
        duration_secs,
        params,
    );

    ClipStreams {
        video,
        audio,
        duration_secs,
    }
}

fn build_video_stream(
    graph: &mut FilterGraph,
    labels: &mut LabelAllocator,
    clip: &Clip,
    input_index: usize,
    params: &RenderParams,
) -> String {
    let (w, h) = (params.width, params.height);
    let mut filters = vec![
        Filter::new("trim")
            .arg("start", clip.source_start)
            .arg("end", clip.source_end),
        Filter::new("setpts").pos("PTS-STARTPTS"),
        // Scale to cover the target frame in both dimensions, then crop.
        Filter::new("scale")
            .arg("w", w)
            .arg("h", h)
            .arg("force_original_aspect_ratio", "increase"),
    ];

    match clip.reframe_center_x() {
        Some(center_x) => {
            // Pan reframe: the crop window's horizontal center follows
            // the average keyframe position, clamped so the window never
            // leaves the frame. Vertical center stays fixed.
            let half = w / 2;
            filters.push(
                Filter::new("crop")
                    .arg("w", w)
                    .arg("h", h)
                    .expr("x", format!("clip(iw*{center_x}-{half},0,iw-{w})"))
                    .expr("y", format!("(ih-{h})/2")),
            );
        }
        None => {
            // Center crop to the target aspect.
            filters.push(Filter::new("crop").arg("w", w).arg("h", h));
        }
    }

    filters.push(Filter::new("setsar").pos(1i64));
    filters.push(Filter::new("fps").pos(params.fps));
    filters.push(Filter::new("format").pos("yuv420p"));

    if let Some(color) = clip.color.filter(|c| !c.is_neutral()) {
        filters.push(
            Filter::new("eq")
                .arg("brightness", color.effective_brightness())
                .arg("contrast", color.contrast)
                .arg("saturation", color.saturation),
        );
        if color.sharpness > 0.0 {
            let amount = (color.sharpness * 1.5).clamp(0.0, 5.0);
            filters.push(
                Filter::new("unsharp")
                    .arg("luma_msize_x", 5i64)
                    .arg("luma_msize_y", 5i64)
                    .arg("luma_amount", amount),
            );
        }
    }

    let label = labels.next("v");
    graph.chain(vec![format!("{input_index}:v")], filters, vec![label.clone()]);
    label
}

#[allow(clippy::too_many_arguments)]
fn build_audio_stream(
    graph: &mut FilterGraph,
    labels: &mut LabelAllocator,
    clip: &Clip,
    source: &MediaSource,
    input_index: usize,
    effective_volume: f64,
    duration_secs: f64,
    params: &RenderParams,
) -> String {
    let label = labels.next("a");

    if source.needs_silence() {
        // Stills carry no audio stream; synthesize silence matching the
        // clip's effective duration so the concat/crossfade arithmetic
        // sees identical video and audio lengths.
        graph.chain(
            vec![],
            vec![
                Filter::new("anullsrc")
                    .arg("r", params.audio_sample_rate)
                    .arg("cl", "stereo"),
                Filter::new("atrim").arg("duration", duration_secs),
            ],
            vec![label.clone()],
        );
        return label;
    }

    graph.chain(
        vec![format!("{input_index}:a")],
        vec![
            Filter::new("atrim")
                .arg("start", clip.source_start)
                .arg("end", clip.source_end),
            Filter::new("asetpts").pos("PTS-STARTPTS"),
            Filter::new("aresample").pos(params.audio_sample_rate),
            Filter::new("volume").pos(effective_volume),
        ],
        vec![label.clone()],
    );
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vertcut_timeline_model::{ColorGrade, MediaKind, ReframeKeyframe};

    fn video_source(id: &str) -> MediaSource {
        MediaSource {
            id: id.to_string(),
            path: PathBuf::from(format!("/tmp/{id}.mp4")),
            kind: MediaKind::Video,
            duration_secs: Some(30.0),
            has_audio: true,
        }
    }

    fn image_source(id: &str) -> MediaSource {
        MediaSource {
            id: id.to_string(),
            path: PathBuf::from(format!("/tmp/{id}.png")),
            kind: MediaKind::Image,
            duration_secs: None,
            has_audio: false,
        }
    }

    fn clip(start: f64, end: f64) -> Clip {
        Clip {
            source_id: "a".to_string(),
            source_start: start,
            source_end: end,
            timeline_start: 0.0,
            transition_start: None,
            transition_end: None,
            color: None,
            reframe: None,
            volume: 1.0,
            muted: false,
        }
    }

    fn build(clip: &Clip, source: &MediaSource) -> (String, ClipStreams) {
        let mut graph = FilterGraph::new();
        let mut labels = LabelAllocator::new();
        let streams = build_clip_streams(
            &mut graph,
            &mut labels,
            clip,
            source,
            0,
            1.0,
            &RenderParams::default(),
        );
        (graph.serialize(), streams)
    }

    #[test]
    fn plain_clip_trims_and_center_crops() {
        let (serialized, streams) = build(&clip(1.0, 5.0), &video_source("a"));
        assert!(serialized.contains("[0:v]trim=start=1:end=5,setpts=PTS-STARTPTS"));
        assert!(serialized
            .contains("scale=w=1080:h=1920:force_original_aspect_ratio=increase,crop=w=1080:h=1920,"));
        assert!(serialized.contains("setsar=1,fps=30,format=yuv420p"));
        assert!(serialized.contains("[0:a]atrim=start=1:end=5,asetpts=PTS-STARTPTS"));
        assert!((streams.duration_secs - 4.0).abs() < 1e-9);
    }

    #[test]
    fn neutral_color_emits_no_grading_filters() {
        let mut c = clip(0.0, 4.0);
        c.color = Some(ColorGrade::default());
        let (serialized, _) = build(&c, &video_source("a"));
        assert!(!serialized.contains("eq="));
        assert!(!serialized.contains("unsharp"));
    }

    #[test]
    fn graded_clip_combines_brightness_and_exposure() {
        let mut c = clip(0.0, 4.0);
        c.color = Some(ColorGrade {
            brightness: 1.2,
            contrast: 1.1,
            saturation: 0.9,
            exposure: 0.4,
            sharpness: 0.0,
        });
        let (serialized, _) = build(&c, &video_source("a"));
        // (1.2 - 1.0) + 0.4 * 0.5 = 0.4
        assert!(serialized.contains("eq=brightness=0.4:contrast=1.1:saturation=0.9"));
        assert!(!serialized.contains("unsharp"));
    }

    #[test]
    fn sharpness_adds_unsharp_pass() {
        let mut c = clip(0.0, 4.0);
        c.color = Some(ColorGrade {
            sharpness: 1.0,
            ..ColorGrade::default()
        });
        let (serialized, _) = build(&c, &video_source("a"));
        assert!(serialized.contains("unsharp=luma_msize_x=5:luma_msize_y=5:luma_amount=1.5"));
    }

    #[test]
    fn reframe_emits_clamped_escaped_crop_offset() {
        let mut c = clip(0.0, 4.0);
        c.reframe = Some(vec![
            ReframeKeyframe {
                time_secs: 0.0,
                x: 0.3,
                y: 0.5,
                scale: 1.0,
            },
            ReframeKeyframe {
                time_secs: 2.0,
                x: 0.5,
                y: 0.5,
                scale: 1.2,
            },
        ]);
        let (serialized, _) = build(&c, &video_source("a"));
        assert!(serialized.contains("crop=w=1080:h=1920:x=clip(iw*0.4-540\\,0\\,iw-1080)"));
    }

    #[test]
    fn image_clip_synthesizes_silence_of_effective_duration() {
        let (serialized, streams) = build(&clip(0.0, 3.5), &image_source("img"));
        assert!(serialized.contains("anullsrc=r=48000:cl=stereo,atrim=duration=3.5"));
        assert!(!serialized.contains("[0:a]"));
        assert!((streams.duration_secs - 3.5).abs() < 1e-9);
    }

    #[test]
    fn volume_combines_track_and_clip() {
        let mut graph = FilterGraph::new();
        let mut labels = LabelAllocator::new();
        build_clip_streams(
            &mut graph,
            &mut labels,
            &clip(0.0, 2.0),
            &video_source("a"),
            3,
            0.35,
            &RenderParams::default(),
        );
        let serialized = graph.serialize();
        assert!(serialized.contains("[3:a]"));
        assert!(serialized.contains("volume=0.35"));
    }
}
