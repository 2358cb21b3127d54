//! # Player Engine Abstraction
//!
//! The decoding/rendering engine is an external collaborator: it accepts an
//! ordered queue of playable URIs, supports prepare/seek/play/pause, and
//! emits state-change events. [`PlayerController`] is the narrow command
//! surface the session layer drives it through.
//!
//! ## Threading Model
//!
//! Implementations must be `Send + Sync`: commands arrive from transport
//! callback contexts and from the session's background tasks. The session
//! layer serializes whole prepare batches itself; individual commands should
//! be fast and non-blocking.

use crate::error::Result;
use crate::queue::PlaybackQueue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Snapshot of the engine's coarse playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// No queue set, nothing prepared.
    Idle,
    /// Queue set, positioned, not playing.
    Ready,
    /// Actively rendering audio.
    Playing,
    /// Prepared with playback suspended.
    Paused,
}

/// Command surface of the playback engine.
///
/// Mirrors the prepare sequence the session issues as one logical unit:
/// stop-and-clear, set queue, seek to the start index, set the
/// play-when-ready flag. The engine owns decoding, buffering, and output;
/// none of that leaks through this trait.
#[async_trait]
pub trait PlayerController: Send + Sync {
    /// Stop playback and clear any queued items.
    async fn stop_and_clear(&self) -> Result<()>;

    /// Replace the engine's queue with `queue`.
    async fn set_queue(&self, queue: PlaybackQueue) -> Result<()>;

    /// Position the engine at `index` within the queue, at `position_ms`.
    async fn seek_to(&self, index: usize, position_ms: u64) -> Result<()>;

    /// Set whether the engine starts rendering as soon as it is prepared.
    async fn set_play_when_ready(&self, play: bool) -> Result<()>;

    /// Suspend playback, keeping the prepared queue and position.
    async fn pause(&self) -> Result<()>;

    /// Resume playback from the paused position.
    async fn resume(&self) -> Result<()>;

    /// `true` when the engine holds a prepared media item.
    async fn has_prepared_item(&self) -> bool;

    /// `true` while the engine is actively rendering audio.
    async fn is_playing(&self) -> bool;

    /// Index of the engine's current queue item, if prepared.
    async fn current_index(&self) -> Option<usize>;

    /// Playback position within the current item (milliseconds).
    async fn current_position_ms(&self) -> u64;

    /// Duration of the current item (milliseconds), once known.
    async fn current_duration_ms(&self) -> Option<u64>;

    /// Coarse state snapshot for observers.
    async fn state(&self) -> PlayerState;
}
