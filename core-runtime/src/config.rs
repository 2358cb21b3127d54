//! # Core Configuration Module
//!
//! Provides configuration management for the media session core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `SessionConfig` instance that holds the settings the session core needs.
//! It enforces fail-fast validation so a misconfigured host is rejected at
//! construction time rather than on first use.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::config::SessionConfig;
//!
//! let config = SessionConfig::builder()
//!     .project_id("my-firebase-project")
//!     .song_collection("songs")
//!     .build()
//!     .expect("Failed to build config");
//!
//! assert_eq!(config.song_collection, "songs");
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifier of the root browse node exposed to media-browser clients.
pub const DEFAULT_MEDIA_ROOT_ID: &str = "root_id";

/// Session event name surfaced to the transport layer when the catalog is
/// ready but empty.
pub const NETWORK_ERROR_EVENT: &str = "NETWORK_ERROR";

/// Configuration for the media session core.
///
/// Use [`SessionConfig::builder`] to construct instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Remote document-store project hosting the song catalog
    pub project_id: String,

    /// Collection within the store that holds song records
    pub song_collection: String,

    /// Root browse node id exposed to media-browser clients
    pub media_root_id: String,

    /// Buffer size of the core event bus
    pub event_buffer_size: usize,

    /// Timeout applied to one catalog fetch round trip
    #[serde(with = "duration_secs")]
    pub fetch_timeout: Duration,

    /// Whether to fetch notification artwork (best effort)
    pub fetch_artwork: bool,

    /// Timeout applied to one artwork fetch
    #[serde(with = "duration_secs")]
    pub artwork_timeout: Duration,
}

impl SessionConfig {
    /// Start building a configuration.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

/// Builder for [`SessionConfig`] with fail-fast validation.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    project_id: Option<String>,
    song_collection: Option<String>,
    media_root_id: Option<String>,
    event_buffer_size: Option<usize>,
    fetch_timeout: Option<Duration>,
    fetch_artwork: Option<bool>,
    artwork_timeout: Option<Duration>,
}

impl SessionConfigBuilder {
    /// Set the remote document-store project id (required).
    pub fn project_id(mut self, id: impl Into<String>) -> Self {
        self.project_id = Some(id.into());
        self
    }

    /// Set the song collection name (required).
    pub fn song_collection(mut self, name: impl Into<String>) -> Self {
        self.song_collection = Some(name.into());
        self
    }

    /// Override the root browse node id.
    pub fn media_root_id(mut self, id: impl Into<String>) -> Self {
        self.media_root_id = Some(id.into());
        self
    }

    /// Override the event bus buffer size.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Override the catalog fetch timeout.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Enable or disable notification artwork fetching.
    pub fn fetch_artwork(mut self, enabled: bool) -> Self {
        self.fetch_artwork = Some(enabled);
        self
    }

    /// Override the artwork fetch timeout.
    pub fn artwork_timeout(mut self, timeout: Duration) -> Self {
        self.artwork_timeout = Some(timeout);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a required field is missing or a
    /// provided value is unusable (empty ids, zero buffer size).
    pub fn build(self) -> Result<SessionConfig> {
        let project_id = self
            .project_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Config("project_id is required".to_string()))?;

        let song_collection = self
            .song_collection
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::Config("song_collection is required".to_string()))?;

        let event_buffer_size = self.event_buffer_size.unwrap_or(100);
        if event_buffer_size == 0 {
            return Err(Error::Config(
                "event_buffer_size must be greater than zero".to_string(),
            ));
        }

        Ok(SessionConfig {
            project_id,
            song_collection,
            media_root_id: self
                .media_root_id
                .unwrap_or_else(|| DEFAULT_MEDIA_ROOT_ID.to_string()),
            event_buffer_size,
            fetch_timeout: self.fetch_timeout.unwrap_or(Duration::from_secs(30)),
            fetch_artwork: self.fetch_artwork.unwrap_or(true),
            artwork_timeout: self.artwork_timeout.unwrap_or(Duration::from_secs(10)),
        })
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
