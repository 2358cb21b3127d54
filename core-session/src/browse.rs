//! Browse-request plumbing.
//!
//! A media-browser client asks for the children of a browse node. When the
//! catalog gate is already terminal the reply completes within the request;
//! otherwise the responder is *detached*, moved into a background completion
//! that fires once the gate settles. The transport adapter only ever sees a
//! [`BrowseResponder`] to hand in and a [`BrowseResult`] coming back on the
//! channel it kept.

use core_catalog::Track;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

/// Browsable descriptor of one catalog track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Stable media id, used for play-from-id requests.
    pub media_id: String,
    /// Display title.
    pub title: String,
    /// Secondary display text.
    pub subtitle: String,
    /// Artwork location for list surfaces.
    pub icon_url: String,
    /// `true` for playable leaves (all catalog tracks are).
    pub playable: bool,
}

impl From<&Track> for MediaItem {
    fn from(track: &Track) -> Self {
        Self {
            media_id: track.media_id.clone(),
            title: track.title.clone(),
            subtitle: track.subtitle.clone(),
            icon_url: track.image_url.clone(),
            playable: true,
        }
    }
}

/// Ways a browse request can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowseError {
    /// The requested parent node is not served by this session.
    #[error("Unknown browse parent: {0}")]
    UnknownParent(String),

    /// The catalog came up ready but empty; surfaced as a network error
    /// instead of an empty success.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// The session shut down before the reply could be completed.
    #[error("Browse request cancelled")]
    Cancelled,
}

/// Outcome of one browse request.
pub type BrowseResult = std::result::Result<Vec<MediaItem>, BrowseError>;

/// Single-use reply channel for one browse request.
///
/// Created in pairs with the receiver the transport adapter awaits. The
/// coordinator completes it exactly once, synchronously or after detaching.
/// Dropping an uncompleted responder closes the receiver, which the adapter
/// should treat as [`BrowseError::Cancelled`].
#[derive(Debug)]
pub struct BrowseResponder {
    tx: oneshot::Sender<BrowseResult>,
}

impl BrowseResponder {
    /// Create a responder and the receiver for its eventual reply.
    pub fn channel() -> (Self, oneshot::Receiver<BrowseResult>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Complete the request. A receiver that already went away is logged and
    /// otherwise ignored; the client gave up on the reply.
    pub fn complete(self, result: BrowseResult) {
        if self.tx.send(result).is_err() {
            debug!("browse receiver dropped before completion");
        }
    }
}
