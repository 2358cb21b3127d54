//! # Core Playback Module
//!
//! Queue construction and the player-engine abstraction. The decoding and
//! rendering engine itself is an external collaborator; this crate defines
//! the narrow command surface the session layer drives it through, plus the
//! pure logic that turns a catalog snapshot into a concrete ordered queue.

pub mod error;
pub mod queue;
pub mod traits;

pub use error::{PlaybackError, Result};
pub use queue::{build_queue, start_index, PlaybackQueue, QueueEntry};
pub use traits::{PlayerController, PlayerState};
