//! The full edit-decision structure submitted for rendering.

use serde::{Deserialize, Serialize};

use crate::{Clip, MediaIndex, ModelError, Track, TrackKind, Transition};

/// Track layout chosen in the editor. Only `solo` (a single video track)
/// is compiled; other layouts are accepted by the parser so the error
/// can be reported precisely instead of as a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Solo,
    Split,
    Grid,
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Solo
    }
}

/// The multi-track edit-decision structure.
///
/// Owned by the caller and passed by value into the compiler, which
/// never mutates it. Only the first video track is processed; secondary
/// audio tracks are overlaid onto the master audio stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    pub layout: Layout,

    pub video_tracks: Vec<Track>,

    #[serde(default)]
    pub audio_tracks: Vec<Track>,
}

/// Resolve the transition governing the boundary between two adjacent
/// clips: the earlier clip's outgoing transition wins, then the later
/// clip's incoming one.
pub fn transition_between(earlier: &Clip, later: &Clip) -> Option<Transition> {
    earlier.transition_end.or(later.transition_start)
}

impl Timeline {
    /// The video track the compiler processes.
    pub fn primary_video_track(&self) -> Option<&Track> {
        self.video_tracks.first()
    }

    /// Analytically expected duration of the compiled output.
    ///
    /// Mirrors the transition-fold arithmetic: each crossfaded boundary
    /// overlaps the next clip into the chain by the transition duration,
    /// unless the accumulated chain is too short to support the overlap,
    /// in which case the boundary degrades to a hard cut. Start and end
    /// fades overlap the clips' own time and never extend the chain.
    pub fn expected_duration(&self) -> f64 {
        let Some(track) = self.primary_video_track() else {
            return 0.0;
        };

        let mut chain_end = 0.0f64;
        for (i, clip) in track.clips.iter().enumerate() {
            let duration = clip.duration_secs();
            if i == 0 {
                chain_end = duration;
                continue;
            }

            let overlap = transition_between(&track.clips[i - 1], clip)
                .map(|t| t.duration_secs)
                .filter(|d| *d > 0.0);

            match overlap {
                Some(d) if chain_end - d >= 0.0 => {
                    chain_end = (chain_end - d) + duration;
                }
                _ => chain_end += duration,
            }
        }

        chain_end
    }

    /// Validate the timeline as compiler input: supported layout, at
    /// least one video clip, per-track invariants, and every clip
    /// resolvable against the media index.
    pub fn validate(&self, media: &MediaIndex) -> Result<(), ModelError> {
        if self.layout != Layout::Solo {
            return Err(ModelError::UnsupportedLayout(format!("{:?}", self.layout)));
        }

        let track = self
            .primary_video_track()
            .filter(|t| !t.clips.is_empty())
            .ok_or(ModelError::EmptyTimeline)?;

        if track.kind != TrackKind::Video {
            return Err(ModelError::InvalidClip(
                "primary track must be a video track".to_string(),
            ));
        }

        for t in self.video_tracks.iter().chain(self.audio_tracks.iter()) {
            t.validate()?;
            for clip in &t.clips {
                media.resolve(&clip.source_id)?;
            }
        }

        Ok(())
    }
}
