//! Firestore REST v1 wire types.
//!
//! Only the slice of the document schema the song collection uses is
//! modeled: flat documents whose fields are string values.

use core_catalog::SongRecord;
use serde::Deserialize;
use std::collections::HashMap;

/// Response of `documents:list` for one page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    /// Documents on this page; absent key means an empty collection.
    #[serde(default)]
    pub documents: Vec<Document>,
    /// Cursor for the next page, when more documents exist.
    pub next_page_token: Option<String>,
}

/// One Firestore document.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    /// Full resource name
    /// (`projects/{p}/databases/(default)/documents/{collection}/{id}`).
    pub name: String,
    /// Field map in the Firestore value envelope.
    #[serde(default)]
    pub fields: HashMap<String, FirestoreValue>,
}

/// Firestore's typed value envelope, narrowed to what song records use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreValue {
    pub string_value: Option<String>,
    /// Firestore encodes integers as strings on the wire.
    pub integer_value: Option<String>,
}

impl FirestoreValue {
    /// The value as display text, whichever envelope slot holds it.
    pub fn as_text(&self) -> Option<&str> {
        self.string_value
            .as_deref()
            .or(self.integer_value.as_deref())
    }
}

impl Document {
    fn text_field(&self, key: &str) -> String {
        self.fields
            .get(key)
            .and_then(FirestoreValue::as_text)
            .unwrap_or_default()
            .to_string()
    }

    /// Trailing path segment of the resource name.
    fn document_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Convert into the store-schema song record.
    ///
    /// A document without an explicit `mediaId` field falls back to its
    /// document id, which is stable for the document's lifetime.
    pub fn into_song_record(self) -> SongRecord {
        let media_id = {
            let explicit = self.text_field("mediaId");
            if explicit.is_empty() {
                self.document_id().to_string()
            } else {
                explicit
            }
        };
        SongRecord {
            media_id,
            title: self.text_field("title"),
            subtitle: self.text_field("subtitle"),
            song_url: self.text_field("songUrl"),
            image_url: self.text_field("imageUrl"),
        }
    }
}
