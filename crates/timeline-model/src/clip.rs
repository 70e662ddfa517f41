//! Clips, transitions, color grading, and reframe keyframes.

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Transition effect attached to a clip boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(rename = "type")]
    pub kind: TransitionKind,

    /// Transition length in seconds.
    pub duration_secs: f64,
}

/// Transition type tags as submitted by the editor frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    CrossDissolve,
    AdditiveDissolve,
    BlurDissolve,
    NonAdditiveDissolve,
    SmoothCut,
    DipToBlack,
    DipToWhite,
    FadeIn,
    FadeOut,
}

impl TransitionKind {
    /// Whether a start/end fade against nothing should use white
    /// instead of black.
    pub fn fades_to_white(self) -> bool {
        matches!(self, TransitionKind::DipToWhite)
    }
}

/// Color grading parameters, each normalized so the default is neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorGrade {
    /// Multiplier around 1.0.
    pub brightness: f64,

    /// Multiplier around 1.0.
    pub contrast: f64,

    /// Multiplier around 1.0.
    pub saturation: f64,

    /// Additive stops around 0.0; folded into brightness at compile time.
    pub exposure: f64,

    /// Sharpening strength in [0, 1]; 0 disables the sharpening pass.
    pub sharpness: f64,
}

impl Default for ColorGrade {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            exposure: 0.0,
            sharpness: 0.0,
        }
    }
}

impl ColorGrade {
    const EPSILON: f64 = 1e-6;

    /// True when every parameter sits at its neutral default, in which
    /// case the compiler emits no grading filters at all.
    pub fn is_neutral(&self) -> bool {
        (self.brightness - 1.0).abs() < Self::EPSILON
            && (self.contrast - 1.0).abs() < Self::EPSILON
            && (self.saturation - 1.0).abs() < Self::EPSILON
            && self.exposure.abs() < Self::EPSILON
            && self.sharpness.abs() < Self::EPSILON
    }

    /// Effective brightness term combining brightness and exposure.
    pub fn effective_brightness(&self) -> f64 {
        (self.brightness - 1.0) + self.exposure * 0.5
    }
}

/// A timestamped pan/zoom sample used to reframe a wide source into the
/// vertical target aspect. Coordinates are normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReframeKeyframe {
    pub time_secs: f64,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

/// A trimmed, positioned reference to one media source within a track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    /// Id of the referenced media source.
    pub source_id: String,

    /// Trim window start in source time (seconds).
    pub source_start: f64,

    /// Trim window end in source time (seconds, exclusive).
    pub source_end: f64,

    /// Position on the track (seconds).
    pub timeline_start: f64,

    /// Transition into this clip, or a fade-in on the first clip.
    #[serde(default)]
    pub transition_start: Option<Transition>,

    /// Transition out of this clip, or a fade-out on the last clip.
    #[serde(default)]
    pub transition_end: Option<Transition>,

    /// Color grading, applied only when non-neutral.
    #[serde(default)]
    pub color: Option<ColorGrade>,

    /// Ordered pan/zoom keyframes for reframe cropping.
    #[serde(default)]
    pub reframe: Option<Vec<ReframeKeyframe>>,

    /// Volume multiplier applied on top of the track volume.
    #[serde(default = "default_volume")]
    pub volume: f64,

    #[serde(default)]
    pub muted: bool,
}

fn default_volume() -> f64 {
    1.0
}

impl Clip {
    /// Effective duration of the clip on the timeline.
    pub fn duration_secs(&self) -> f64 {
        self.source_end - self.source_start
    }

    /// Average x position over the reframe keyframes, if any.
    ///
    /// Export reframing uses a single static crop centered on this
    /// average; per-keyframe scale is not compiled.
    pub fn reframe_center_x(&self) -> Option<f64> {
        let keyframes = self.reframe.as_deref()?;
        if keyframes.is_empty() {
            return None;
        }
        let sum: f64 = keyframes.iter().map(|k| k.x).sum();
        Some((sum / keyframes.len() as f64).clamp(0.0, 1.0))
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.source_start.is_finite() || !self.source_end.is_finite() {
            return Err(ModelError::InvalidClip(format!(
                "non-finite trim window for source {}",
                self.source_id
            )));
        }
        if self.source_start >= self.source_end {
            return Err(ModelError::InvalidClip(format!(
                "source_start {} must be before source_end {} for source {}",
                self.source_start, self.source_end, self.source_id
            )));
        }
        if self.timeline_start < 0.0 {
            return Err(ModelError::InvalidClip(format!(
                "negative timeline_start {} for source {}",
                self.timeline_start, self.source_id
            )));
        }
        if self.volume < 0.0 {
            return Err(ModelError::InvalidClip(format!(
                "negative volume {} for source {}",
                self.volume, self.source_id
            )));
        }
        Ok(())
    }
}
