//! Track data model.
//!
//! A [`Track`] is immutable once fetched: the catalog is replaced wholesale
//! on re-fetch, never patched in place.

use serde::{Deserialize, Serialize};

/// One playable track in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Unique, stable identifier.
    pub media_id: String,
    /// Display title.
    pub title: String,
    /// Secondary display text (artist).
    pub subtitle: String,
    /// Artwork location, fetched best effort for notification surfaces.
    pub image_url: String,
    /// Playable source locator handed to the playback engine.
    pub media_uri: String,
}

/// Raw song record as stored in the remote document store.
///
/// Field names follow the store's document schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    #[serde(default)]
    pub media_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub song_url: String,
    #[serde(default)]
    pub image_url: String,
}

impl From<SongRecord> for Track {
    fn from(record: SongRecord) -> Self {
        Self {
            media_id: record.media_id,
            title: record.title,
            subtitle: record.subtitle,
            image_url: record.image_url,
            media_uri: record.song_url,
        }
    }
}
