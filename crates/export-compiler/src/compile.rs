//! Side-effect-free timeline compilation.
//!
//! `compile(Timeline) -> RenderGraph` builds the whole processing graph
//! without touching the filesystem or spawning anything, so its
//! correctness is testable without ever invoking the encoder.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use vertcut_common::{VertcutError, VertcutResult};
use vertcut_timeline_model::{MediaIndex, MediaKind, ModelError, Timeline};

use crate::audio_mix::{collect_overlays, mix_onto_master};
use crate::clip_graph::build_clip_streams;
use crate::graph::{FilterGraph, LabelAllocator};
use crate::transition::fold_clips;

/// Fixed output geometry for the vertical render target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RenderParams {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub audio_sample_rate: u32,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
            audio_sample_rate: 48000,
        }
    }
}

/// One `-i` input of the assembled ffmpeg invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderInput {
    pub path: PathBuf,

    /// Stills are looped into a video stream and bounded by
    /// `limit_secs` so the trim window has material to cut from.
    pub loop_still: bool,

    pub limit_secs: Option<f64>,
}

/// The fully compiled processing graph, ready for the render executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderGraph {
    pub inputs: Vec<RenderInput>,

    /// Serialized `-filter_complex` graph.
    pub filter_complex: String,

    /// Label of the final video stream.
    pub video_out: String,

    /// Label of the final audio stream.
    pub audio_out: String,

    /// Analytic duration of the output, used for progress percentage.
    pub expected_duration_secs: f64,
}

fn model_error(err: ModelError) -> VertcutError {
    match err {
        ModelError::UnsupportedLayout(layout) => {
            VertcutError::unsupported(format!("layout {layout} is not supported, use solo"))
        }
        other => VertcutError::validation(other.to_string()),
    }
}

/// Compile a timeline into a render graph.
///
/// The timeline is validated first; a clip referencing an unknown media
/// source or a non-solo layout is fatal, since every downstream offset
/// depends on every clip being present.
pub fn compile(
    timeline: &Timeline,
    media: &MediaIndex,
    params: &RenderParams,
) -> VertcutResult<RenderGraph> {
    timeline.validate(media).map_err(model_error)?;

    let track = timeline
        .primary_video_track()
        .ok_or_else(|| model_error(ModelError::EmptyTimeline))?;

    let mut graph = FilterGraph::new();
    let mut labels = LabelAllocator::new();
    let mut inputs: Vec<RenderInput> = Vec::new();
    let mut index_of: HashMap<String, usize> = HashMap::new();

    // Register inputs in clip order: primary video track first, then
    // secondary audio tracks. Repeated sources share one input.
    let all_clips = track
        .clips
        .iter()
        .chain(timeline.audio_tracks.iter().flat_map(|t| t.clips.iter()));
    for clip in all_clips {
        let source = media.resolve(&clip.source_id).map_err(model_error)?;
        match index_of.get(&clip.source_id) {
            Some(&idx) => {
                if let Some(limit) = &mut inputs[idx].limit_secs {
                    *limit = limit.max(clip.source_end);
                }
            }
            None => {
                let idx = inputs.len();
                index_of.insert(clip.source_id.clone(), idx);
                let is_still = source.kind == MediaKind::Image;
                inputs.push(RenderInput {
                    path: source.path.clone(),
                    loop_still: is_still,
                    limit_secs: is_still.then_some(clip.source_end),
                });
            }
        }
    }

    // Per-clip sub-graphs for the primary video track.
    let mut streams = Vec::with_capacity(track.clips.len());
    for clip in &track.clips {
        let source = media.resolve(&clip.source_id).map_err(model_error)?;
        streams.push(build_clip_streams(
            &mut graph,
            &mut labels,
            clip,
            source,
            index_of[&clip.source_id],
            track.effective_volume(clip),
            params,
        ));
    }

    // Fold into continuous streams, then overlay secondary audio.
    let chain = fold_clips(&mut graph, &mut labels, &track.clips, &streams);
    let overlays = collect_overlays(&timeline.audio_tracks, |id| index_of[id]);
    let audio_out = mix_onto_master(&mut graph, &mut labels, chain.audio.clone(), &overlays, params);

    let expected = timeline.expected_duration();
    if (chain.chain_end - expected).abs() > 1e-6 {
        tracing::warn!(
            chain_end = chain.chain_end,
            expected,
            "Compiled chain end diverges from analytic timeline duration"
        );
    }
    debug_assert!((chain.chain_end - expected).abs() < 1e-6);

    Ok(RenderGraph {
        inputs,
        filter_complex: graph.serialize(),
        video_out: chain.video,
        audio_out,
        expected_duration_secs: chain.chain_end,
    })
}
