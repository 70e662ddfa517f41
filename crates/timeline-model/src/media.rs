//! Resolved source media.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Kind of a source media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

/// A source file on disk, immutable once resolved.
///
/// For video and audio sources `duration_secs` holds the probed duration
/// and `has_audio` whether an audio stream is present. Images have no
/// native duration or audio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSource {
    /// Opaque identifier clips use to reference this source.
    pub id: String,

    /// Absolute path on disk.
    pub path: PathBuf,

    pub kind: MediaKind,

    /// Probed duration, if the container carries one.
    pub duration_secs: Option<f64>,

    /// Whether the file contains an audio stream.
    pub has_audio: bool,
}

impl MediaSource {
    /// Whether the clip audio sub-graph must synthesize silence for
    /// this source.
    pub fn needs_silence(&self) -> bool {
        self.kind == MediaKind::Image || !self.has_audio
    }
}

/// Lookup table from source id to resolved media, built after probing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaIndex {
    sources: HashMap<String, MediaSource>,
}

impl MediaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: MediaSource) {
        self.sources.insert(source.id.clone(), source);
    }

    pub fn get(&self, id: &str) -> Option<&MediaSource> {
        self.sources.get(id)
    }

    /// Resolve a clip's source reference, failing on dangling ids.
    pub fn resolve(&self, id: &str) -> Result<&MediaSource, ModelError> {
        self.sources
            .get(id)
            .ok_or_else(|| ModelError::UnknownSource(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaSource> {
        self.sources.values()
    }
}
