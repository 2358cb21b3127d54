//! Now-playing notification content.
//!
//! Given the coordinator's current track, builds the title/subtitle/artwork
//! payload a foreground notification renders. The artwork fetch is a
//! best-effort network load: any failure, timeout, or disabled fetch simply
//! yields a notification without large-icon art.

use bytes::Bytes;
use core_catalog::Track;
use core_runtime::config::SessionConfig;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Snapshot of the currently selected track and engine position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    /// The selected track.
    pub track: Track,
    /// Duration of the engine's current item (milliseconds), once known.
    pub duration_ms: Option<u64>,
    /// Playback position (milliseconds).
    pub position_ms: u64,
    /// Whether the engine is actively rendering audio.
    pub is_playing: bool,
}

/// Renderable notification payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    /// Primary line: track title.
    pub title: String,
    /// Secondary line: artist/subtitle.
    pub subtitle: String,
    /// Duration to display, if known (milliseconds).
    pub duration_ms: Option<u64>,
    /// Large-icon artwork bytes; `None` when unavailable.
    pub artwork: Option<Bytes>,
}

/// Builds [`NotificationContent`] for now-playing updates.
pub struct NotificationBuilder {
    client: reqwest::Client,
    fetch_artwork: bool,
    artwork_timeout: Duration,
}

impl NotificationBuilder {
    /// Create a builder honoring the session's artwork settings.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            fetch_artwork: config.fetch_artwork,
            artwork_timeout: config.artwork_timeout,
        }
    }

    /// Build content for `now_playing`.
    ///
    /// Never fails: artwork problems degrade to `artwork: None`.
    pub async fn content_for(&self, now_playing: &NowPlaying) -> NotificationContent {
        let artwork = if self.fetch_artwork {
            self.fetch_art(&now_playing.track.image_url).await
        } else {
            None
        };

        NotificationContent {
            title: now_playing.track.title.clone(),
            subtitle: now_playing.track.subtitle.clone(),
            duration_ms: now_playing.duration_ms,
            artwork,
        }
    }

    #[instrument(skip(self))]
    async fn fetch_art(&self, url: &str) -> Option<Bytes> {
        if url.is_empty() {
            return None;
        }

        let response = self
            .client
            .get(url)
            .timeout(self.artwork_timeout)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => match resp.bytes().await {
                Ok(bytes) => {
                    debug!(len = bytes.len(), "artwork fetched");
                    Some(bytes)
                }
                Err(err) => {
                    warn!(error = %err, "artwork body read failed");
                    None
                }
            },
            Ok(resp) => {
                warn!(status = %resp.status(), "artwork fetch rejected");
                None
            }
            Err(err) => {
                warn!(error = %err, "artwork fetch failed");
                None
            }
        }
    }
}
