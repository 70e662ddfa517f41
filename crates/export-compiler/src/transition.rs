//! Transition folding.
//!
//! Folds the ordered per-clip sub-graphs into one continuous video
//! stream and one continuous audio stream, tracking the running
//! `chain_end` — the duration in seconds of the chain built so far.

use vertcut_timeline_model::{transition_between, Clip, Transition, TransitionKind};

use crate::clip_graph::ClipStreams;
use crate::graph::{Filter, FilterGraph, LabelAllocator};

/// The continuously built output streams.
#[derive(Debug, Clone)]
pub struct ChainState {
    pub video: String,
    pub audio: String,
    pub chain_end: f64,
}

/// Map a transition type to its xfade effect family.
fn xfade_transition_name(kind: TransitionKind) -> &'static str {
    match kind {
        TransitionKind::CrossDissolve | TransitionKind::SmoothCut => "fade",
        TransitionKind::AdditiveDissolve
        | TransitionKind::BlurDissolve
        | TransitionKind::NonAdditiveDissolve => "pixelize",
        TransitionKind::DipToBlack | TransitionKind::FadeIn | TransitionKind::FadeOut => {
            "fadeblack"
        }
        TransitionKind::DipToWhite => "fadewhite",
    }
}

fn fade_color(kind: TransitionKind) -> &'static str {
    if kind.fades_to_white() {
        "white"
    } else {
        "black"
    }
}

/// Fold clip sub-graphs in timeline order into a single video/audio pair.
///
/// `clips` and `streams` are parallel: the model clip carries the
/// transition metadata, the streams carry the labels built for it.
pub fn fold_clips(
    graph: &mut FilterGraph,
    labels: &mut LabelAllocator,
    clips: &[Clip],
    streams: &[ClipStreams],
) -> ChainState {
    debug_assert_eq!(clips.len(), streams.len());
    debug_assert!(!clips.is_empty());

    let mut state = ChainState {
        video: streams[0].video.clone(),
        audio: streams[0].audio.clone(),
        chain_end: streams[0].duration_secs,
    };

    // Start boundary: a fade-in against nothing on the first clip.
    if let Some(fade) = clips[0].transition_start.filter(|t| t.duration_secs > 0.0) {
        apply_edge_fade(graph, labels, &mut state, fade, FadeDirection::In, 0.0);
    }

    // Middle boundaries.
    for i in 1..clips.len() {
        let next = &streams[i];
        let transition =
            transition_between(&clips[i - 1], &clips[i]).filter(|t| t.duration_secs > 0.0);

        match transition {
            Some(t) => {
                let offset = state.chain_end - t.duration_secs;
                if offset < 0.0 {
                    // The accumulated chain is too short to support the
                    // requested overlap; degrade to a hard cut. Defined
                    // recovery, not an error.
                    tracing::debug!(
                        chain_end = state.chain_end,
                        requested = t.duration_secs,
                        "Transition overlap exceeds chain length, falling back to cut"
                    );
                    concat_pair(graph, labels, &mut state, next);
                } else {
                    crossfade_pair(graph, labels, &mut state, next, t, offset);
                }
            }
            None => concat_pair(graph, labels, &mut state, next),
        }
    }

    // End boundary: a fade-out against nothing on the last clip.
    if let Some(fade) = clips[clips.len() - 1]
        .transition_end
        .filter(|t| t.duration_secs > 0.0)
    {
        let fade_out_start = state.chain_end - fade.duration_secs;
        if fade_out_start > 0.0 {
            apply_edge_fade(
                graph,
                labels,
                &mut state,
                fade,
                FadeDirection::Out,
                fade_out_start,
            );
        } else {
            // Chain shorter than the requested fade; skip silently.
            tracing::debug!(
                chain_end = state.chain_end,
                requested = fade.duration_secs,
                "Fade-out longer than chain, skipping"
            );
        }
    }

    state
}

enum FadeDirection {
    In,
    Out,
}

fn apply_edge_fade(
    graph: &mut FilterGraph,
    labels: &mut LabelAllocator,
    state: &mut ChainState,
    fade: Transition,
    direction: FadeDirection,
    start_secs: f64,
) {
    let t = match direction {
        FadeDirection::In => "in",
        FadeDirection::Out => "out",
    };

    let video_out = labels.next("vf");
    graph.chain(
        vec![state.video.clone()],
        vec![Filter::new("fade")
            .arg("t", t)
            .arg("st", start_secs)
            .arg("d", fade.duration_secs)
            .arg("color", fade_color(fade.kind))],
        vec![video_out.clone()],
    );

    let audio_out = labels.next("af");
    graph.chain(
        vec![state.audio.clone()],
        vec![Filter::new("afade")
            .arg("t", t)
            .arg("st", start_secs)
            .arg("d", fade.duration_secs)],
        vec![audio_out.clone()],
    );

    state.video = video_out;
    state.audio = audio_out;
}

/// Time-overlapped crossfade: the next clip starts blending in at
/// `offset` seconds into the chain built so far.
fn crossfade_pair(
    graph: &mut FilterGraph,
    labels: &mut LabelAllocator,
    state: &mut ChainState,
    next: &ClipStreams,
    transition: Transition,
    offset: f64,
) {
    let video_out = labels.next("vx");
    graph.chain(
        vec![state.video.clone(), next.video.clone()],
        vec![Filter::new("xfade")
            .arg("transition", xfade_transition_name(transition.kind))
            .arg("duration", transition.duration_secs)
            .arg("offset", offset)],
        vec![video_out.clone()],
    );

    let audio_out = labels.next("ax");
    graph.chain(
        vec![state.audio.clone(), next.audio.clone()],
        vec![Filter::new("acrossfade").arg("d", transition.duration_secs)],
        vec![audio_out.clone()],
    );

    state.video = video_out;
    state.audio = audio_out;
    state.chain_end = offset + next.duration_secs;
}

/// Hard cut: pairwise concatenation with no overlap.
fn concat_pair(
    graph: &mut FilterGraph,
    labels: &mut LabelAllocator,
    state: &mut ChainState,
    next: &ClipStreams,
) {
    let video_out = labels.next("vc");
    graph.chain(
        vec![state.video.clone(), next.video.clone()],
        vec![Filter::new("concat")
            .arg("n", 2i64)
            .arg("v", 1i64)
            .arg("a", 0i64)],
        vec![video_out.clone()],
    );

    let audio_out = labels.next("ac");
    graph.chain(
        vec![state.audio.clone(), next.audio.clone()],
        vec![Filter::new("concat")
            .arg("n", 2i64)
            .arg("v", 0i64)
            .arg("a", 1i64)],
        vec![audio_out.clone()],
    );

    state.video = video_out;
    state.audio = audio_out;
    state.chain_end += next.duration_secs;
}
