//! End-to-end compilation scenarios over full timelines.

use std::path::PathBuf;

use proptest::prelude::*;
use vertcut_export_compiler::{compile, RenderParams};
use vertcut_timeline_model::{
    Clip, Layout, MediaIndex, MediaKind, MediaSource, Timeline, Track, TrackKind, Transition,
    TransitionKind,
};

fn video_source(id: &str) -> MediaSource {
    MediaSource {
        id: id.to_string(),
        path: PathBuf::from(format!("/tmp/{id}.mp4")),
        kind: MediaKind::Video,
        duration_secs: Some(120.0),
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

fn clip(source_id: &str, duration: f64, timeline_start: f64) -> Clip {
    Clip {
        source_id: source_id.to_string(),
        source_start: 0.0,
        source_end: duration,
        timeline_start,
        transition_start: None,
        transition_end: None,
        color: None,
        reframe: None,
        volume: 1.0,
        muted: false,
    }
}

fn solo_timeline(clips: Vec<Clip>) -> Timeline {
    Timeline {
        layout: Layout::Solo,
        video_tracks: vec![Track {
            kind: TrackKind::Video,
            clips,
            volume: 1.0,
            muted: false,
        }],
        audio_tracks: vec![],
    }
}

fn media_for(timeline: &Timeline) -> MediaIndex {
    let mut media = MediaIndex::new();
    for track in timeline
        .video_tracks
        .iter()
        .chain(timeline.audio_tracks.iter())
    {
        for clip in &track.clips {
            if media.get(&clip.source_id).is_none() {
                if clip.source_id.ends_with(".png") {
                    media.insert(image_source(&clip.source_id));
                } else {
                    media.insert(video_source(&clip.source_id));
                }
            }
        }
    }
    media
}

#[test]
fn single_clip_with_start_and_end_fades_keeps_its_duration() {
    let mut only = clip("a", 10.0, 0.0);
    only.transition_start = Some(Transition {
        kind: TransitionKind::FadeIn,
        duration_secs: 1.0,
    });
    only.transition_end = Some(Transition {
        kind: TransitionKind::FadeOut,
        duration_secs: 1.0,
    });
    let timeline = solo_timeline(vec![only]);
    let media = media_for(&timeline);

    let graph = compile(&timeline, &media, &RenderParams::default()).unwrap();
    assert!((graph.expected_duration_secs - 10.0).abs() < 1e-9);
    assert!(graph.filter_complex.contains("fade=t=in:st=0:d=1"));
    assert!(graph.filter_complex.contains("fade=t=out:st=9:d=1"));
}

#[test]
fn two_clips_with_cross_dissolve_overlap() {
    let mut first = clip("a", 5.0, 0.0);
    first.transition_end = Some(Transition {
        kind: TransitionKind::CrossDissolve,
        duration_secs: 2.0,
    });
    let timeline = solo_timeline(vec![first, clip("b", 5.0, 5.0)]);
    let media = media_for(&timeline);

    let graph = compile(&timeline, &media, &RenderParams::default()).unwrap();
    assert!((graph.expected_duration_secs - 8.0).abs() < 1e-9);
    assert!(graph
        .filter_complex
        .contains("xfade=transition=fade:duration=2:offset=3"));
}

#[test]
fn short_clips_with_oversized_dissolve_fall_back_to_cut() {
    let mut first = clip("a", 1.0, 0.0);
    first.transition_end = Some(Transition {
        kind: TransitionKind::CrossDissolve,
        duration_secs: 2.0,
    });
    let timeline = solo_timeline(vec![first, clip("b", 1.0, 1.0)]);
    let media = media_for(&timeline);

    let graph = compile(&timeline, &media, &RenderParams::default()).unwrap();
    assert!((graph.expected_duration_secs - 2.0).abs() < 1e-9);
    assert!(!graph.filter_complex.contains("xfade"));
    assert!(!graph.filter_complex.contains("offset=-"));
}

#[test]
fn image_clip_gets_silence_matching_video_padding() {
    let timeline = solo_timeline(vec![clip("still.png", 2.5, 0.0), clip("b", 4.0, 2.5)]);
    let media = media_for(&timeline);

    let graph = compile(&timeline, &media, &RenderParams::default()).unwrap();
    assert!(graph
        .filter_complex
        .contains("anullsrc=r=48000:cl=stereo,atrim=duration=2.5"));
    assert!((graph.expected_duration_secs - 6.5).abs() < 1e-9);
}

#[test]
fn recompilation_is_byte_identical() {
    let mut first = clip("a", 5.0, 0.0);
    first.transition_end = Some(Transition {
        kind: TransitionKind::DipToBlack,
        duration_secs: 1.0,
    });
    let mut timeline = solo_timeline(vec![first, clip("b", 3.0, 5.0), clip("still.png", 2.0, 8.0)]);
    timeline.audio_tracks = vec![Track {
        kind: TrackKind::Audio,
        clips: vec![clip("music", 6.0, 1.0)],
        volume: 0.6,
        muted: false,
    }];
    let media = media_for(&timeline);

    let once = compile(&timeline, &media, &RenderParams::default()).unwrap();
    let twice = compile(&timeline, &media, &RenderParams::default()).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once.filter_complex, twice.filter_complex);
}

proptest! {
    /// The folded chain end always matches the analytic timeline
    /// duration, for any mix of clip lengths and boundary transitions.
    #[test]
    fn chain_end_matches_analytic_duration(
        durations in prop::collection::vec(0.5f64..20.0, 1..8),
        transition_len in prop::collection::vec(prop::option::of(0.1f64..6.0), 0..8),
    ) {
        let mut clips = Vec::new();
        let mut cursor = 0.0;
        for (i, d) in durations.iter().enumerate() {
            let mut c = clip(&format!("src{i}"), *d, cursor);
            if let Some(Some(len)) = transition_len.get(i) {
                c.transition_end = Some(Transition {
                    kind: TransitionKind::CrossDissolve,
                    duration_secs: *len,
                });
            }
            cursor += d;
            clips.push(c);
        }
        // The last clip's outgoing transition acts as an end fade, which
        // never changes the chain arithmetic.
        let timeline = solo_timeline(clips);
        let media = media_for(&timeline);

        let graph = compile(&timeline, &media, &RenderParams::default()).unwrap();
        prop_assert!((graph.expected_duration_secs - timeline.expected_duration()).abs() < 1e-6);
        prop_assert!(!graph.filter_complex.contains("offset=-"));
    }
}
