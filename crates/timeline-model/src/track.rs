//! Tracks: ordered, non-overlapping clips of one kind.

use serde::{Deserialize, Serialize};

use crate::{Clip, ModelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

/// An ordered list of non-overlapping clips of one kind.
///
/// The editor UI guarantees ordering and non-overlap upstream; the
/// compiler treats a violation as a fatal input error because every
/// downstream offset depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub kind: TrackKind,

    pub clips: Vec<Clip>,

    /// Track-level volume multiplier.
    #[serde(default = "default_volume")]
    pub volume: f64,

    #[serde(default)]
    pub muted: bool,
}

fn default_volume() -> f64 {
    1.0
}

impl Track {
    const OVERLAP_TOLERANCE: f64 = 1e-6;

    /// Effective volume for a clip on this track, honoring both mute flags.
    pub fn effective_volume(&self, clip: &Clip) -> f64 {
        if self.muted || clip.muted {
            0.0
        } else {
            self.volume * clip.volume
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for clip in &self.clips {
            clip.validate()?;
        }

        for pair in self.clips.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if b.timeline_start < a.timeline_start {
                return Err(ModelError::OverlappingClips(format!(
                    "clips out of order at t={} / t={}",
                    a.timeline_start, b.timeline_start
                )));
            }
            let a_end = a.timeline_start + a.duration_secs();
            if b.timeline_start < a_end - Self::OVERLAP_TOLERANCE {
                return Err(ModelError::OverlappingClips(format!(
                    "clip at t={} overlaps previous clip ending at t={a_end}",
                    b.timeline_start
                )));
            }
        }

        Ok(())
    }
}
