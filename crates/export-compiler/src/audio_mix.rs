//! Secondary audio-track mixing.
//!
//! Music and voiceover clips are trimmed, delayed to their timeline
//! position, volume-scaled, and amplitude-mixed onto the master audio
//! stream produced by the transition fold. Delay is the only placement
//! mechanism — secondary tracks are never crossfaded against the master.

use vertcut_timeline_model::{Clip, Track};

use crate::compile::RenderParams;
use crate::graph::{Filter, FilterGraph, LabelAllocator};

/// One secondary clip ready for mixing: model clip, its input index, and
/// the effective track*clip volume.
pub struct OverlayClip<'a> {
    pub clip: &'a Clip,
    pub input_index: usize,
    pub volume: f64,
}

/// Collect overlay entries from the secondary audio tracks.
pub fn collect_overlays<'a>(
    audio_tracks: &'a [Track],
    input_index_of: impl Fn(&str) -> usize,
) -> Vec<OverlayClip<'a>> {
    let mut overlays = Vec::new();
    for track in audio_tracks {
        for clip in &track.clips {
            overlays.push(OverlayClip {
                clip,
                input_index: input_index_of(&clip.source_id),
                volume: track.effective_volume(clip),
            });
        }
    }
    overlays
}

/// Mix overlays onto the master stream; with no overlays the master
/// passes through untouched.
pub fn mix_onto_master(
    graph: &mut FilterGraph,
    labels: &mut LabelAllocator,
    master: String,
    overlays: &[OverlayClip<'_>],
    params: &RenderParams,
) -> String {
    if overlays.is_empty() {
        return master;
    }

    let mut mix_inputs = vec![master];
    for overlay in overlays {
        let delay_ms = (overlay.clip.timeline_start * 1000.0).round() as i64;
        let label = labels.next("m");
        graph.chain(
            vec![format!("{}:a", overlay.input_index)],
            vec![
                Filter::new("atrim")
                    .arg("start", overlay.clip.source_start)
                    .arg("end", overlay.clip.source_end),
                Filter::new("asetpts").pos("PTS-STARTPTS"),
                Filter::new("aresample").pos(params.audio_sample_rate),
                Filter::new("volume").pos(overlay.volume),
                Filter::new("adelay").pos(format!("{delay_ms}|{delay_ms}")),
            ],
            vec![label.clone()],
        );
        mix_inputs.push(label);
    }

    let out = labels.next("mix");
    let n = mix_inputs.len();
    graph.chain(
        mix_inputs,
        vec![Filter::new("amix")
            .arg("inputs", n)
            .arg("duration", "shortest")
            .arg("dropout_transition", 0i64)],
        vec![out.clone()],
    );
    out
}
