//! # Playback Error Types
//!
//! Error types for queue construction and engine control.

use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Track was not found in the current catalog.
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// Attempted a queue operation with no queue set.
    #[error("No queue prepared")]
    NoQueuePrepared,

    /// Requested queue index is out of bounds.
    #[error("Queue index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The engine rejected or failed a command.
    #[error("Engine command failed: {0}")]
    EngineCommand(String),

    /// The engine is gone (released or disconnected).
    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if this error is transient and the command can be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, PlaybackError::EngineUnavailable(_))
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
