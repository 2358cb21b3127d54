//! Playback queue construction.
//!
//! Maps a catalog snapshot onto the concrete ordered queue handed to the
//! playback engine, and computes the start index for a requested track.
//! Pure functions, no engine interaction.

use core_catalog::Track;
use serde::{Deserialize, Serialize};

/// One playable entry in the engine's queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Catalog media id this entry was built from.
    pub media_id: String,
    /// Playable source locator.
    pub media_uri: String,
}

impl From<&Track> for QueueEntry {
    fn from(track: &Track) -> Self {
        Self {
            media_id: track.media_id.clone(),
            media_uri: track.media_uri.clone(),
        }
    }
}

/// Concrete ordered queue of playable sources.
///
/// Rebuilt on every prepare; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackQueue {
    /// Entries in catalog order. Duplicate tracks stay duplicated.
    pub entries: Vec<QueueEntry>,
}

impl PlaybackQueue {
    /// Number of entries in the queue.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the queue holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<&QueueEntry> {
        self.entries.get(index)
    }
}

/// Build the concrete queue from a catalog snapshot.
///
/// One entry per track, input order preserved. A track appearing twice
/// yields two distinct entries.
pub fn build_queue(tracks: &[Track]) -> PlaybackQueue {
    PlaybackQueue {
        entries: tracks.iter().map(QueueEntry::from).collect(),
    }
}

/// Index of `target` within `tracks`, as the engine's start position.
///
/// With no prior selection (`target` is `None`) playback starts at the top
/// of the queue: index `0`. A present target resolves to its first match by
/// media id. A target absent from `tracks` yields `None`, a distinct
/// "not found" signal rather than a default index.
pub fn start_index(tracks: &[Track], target: Option<&Track>) -> Option<usize> {
    match target {
        None => Some(0),
        Some(track) => tracks
            .iter()
            .position(|candidate| candidate.media_id == track.media_id),
    }
}
