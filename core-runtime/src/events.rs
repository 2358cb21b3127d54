//! # Event Bus System
//!
//! Provides an event-driven architecture for the media session core using
//! `tokio::sync::broadcast`. This module enables decoupled communication
//! between the catalog, playback, and session modules and their UI observers.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for different domains
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//! - **Subscription Management**: Multiple subscribers can listen independently
//!
//! UI layers are plain subscribers of this bus: connection/readiness state,
//! current selection, and playback state all arrive as events rather than
//! through observed fields.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, CatalogEvent};
//!
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! let event = CoreEvent::Catalog(CatalogEvent::Ready { track_count: 12 });
//! event_bus.emit(event).ok();
//! ```
//!
//! ## Error Handling
//!
//! The event bus uses `tokio::sync::broadcast`, which can produce two kinds of
//! receive errors:
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   This is non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped. This indicates shutdown.
//!
//! Subscribers should handle `Lagged` gracefully and treat `Closed` as a signal
//! to exit.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// This value balances memory usage with the ability to handle bursts of
/// events. Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
///
/// This is the main event type published and received through the event bus.
/// It wraps domain-specific event types for different modules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Catalog load and readiness events
    Catalog(CatalogEvent),
    /// Session-level events surfaced to the transport/UI layer
    Session(SessionEvent),
    /// Playback engine events
    Player(PlayerEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Catalog(e) => e.description(),
            CoreEvent::Session(e) => e.description(),
            CoreEvent::Player(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Session(SessionEvent::NetworkError { .. }) => EventSeverity::Error,
            CoreEvent::Player(PlayerEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Catalog(CatalogEvent::LoadFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Catalog(CatalogEvent::Ready { .. }) => EventSeverity::Info,
            CoreEvent::Session(SessionEvent::Shutdown) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Catalog Events
// ============================================================================

/// Events related to the remote catalog load cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CatalogEvent {
    /// A catalog load cycle started.
    LoadStarted,
    /// The catalog reached its terminal `Initialized` state.
    Ready {
        /// Number of tracks in the loaded catalog (may be zero).
        track_count: usize,
    },
    /// The catalog reached its terminal `Error` state.
    ///
    /// Not emitted by the default load policy, which degrades fetch failures
    /// to an empty `Ready` catalog; see the session crate documentation.
    LoadFailed {
        /// Human-readable failure description.
        message: String,
    },
}

impl CatalogEvent {
    fn description(&self) -> &str {
        match self {
            CatalogEvent::LoadStarted => "Catalog load started",
            CatalogEvent::Ready { .. } => "Catalog ready",
            CatalogEvent::LoadFailed { .. } => "Catalog load failed",
        }
    }
}

// ============================================================================
// Session Events
// ============================================================================

/// Events surfaced to the hosting media-session/transport layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// The catalog was ready but empty; the transport layer should surface a
    /// network/unavailable error to the user instead of an empty browse list.
    NetworkError {
        /// Human-readable error message.
        message: String,
    },
    /// The current track selection changed.
    SelectionChanged {
        /// Media id of the newly selected track.
        media_id: String,
        /// Track title for display surfaces.
        title: String,
    },
    /// The session was shut down and all background work cancelled.
    Shutdown,
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::NetworkError { .. } => "Network error",
            SessionEvent::SelectionChanged { .. } => "Selection changed",
            SessionEvent::Shutdown => "Session shut down",
        }
    }
}

// ============================================================================
// Player Events
// ============================================================================

/// Events related to the playback engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlayerEvent {
    /// A new queue was prepared on the engine.
    Prepared {
        /// Media id the queue was positioned at.
        media_id: String,
        /// Index of that media id within the queue.
        start_index: usize,
        /// Whether playback starts immediately.
        play_now: bool,
    },
    /// Playback started or resumed.
    Playing {
        /// The media id being played.
        media_id: String,
    },
    /// Playback paused.
    Paused {
        /// The media id that was paused.
        media_id: String,
    },
    /// Playback position changed (seek or natural progression).
    PositionChanged {
        /// New position (milliseconds).
        position_ms: u64,
        /// Track duration (milliseconds), if known.
        duration_ms: Option<u64>,
    },
    /// Playback engine error.
    Error {
        /// The media id if available.
        media_id: Option<String>,
        /// Human-readable error message.
        message: String,
        /// Whether playback can be retried.
        recoverable: bool,
    },
}

impl PlayerEvent {
    fn description(&self) -> &str {
        match self {
            PlayerEvent::Prepared { .. } => "Queue prepared",
            PlayerEvent::Playing { .. } => "Playback started",
            PlayerEvent::Paused { .. } => "Playback paused",
            PlayerEvent::PositionChanged { .. } => "Playback position changed",
            PlayerEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, CoreEvent, SessionEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut subscriber = event_bus.subscribe();
///
/// event_bus
///     .emit(CoreEvent::Session(SessionEvent::Shutdown))
///     .ok();
/// ```
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///   When a subscriber falls behind by more than this amount, it will
    ///   receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new event bus with the default buffer size.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// Returns an error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future
    /// events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with additional filtering.
///
/// This provides a more ergonomic API for consuming events with optional
/// filtering by event type or severity.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, CoreEvent};
///
/// let event_bus = EventBus::new(100);
/// let stream = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Player(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Sets a filter predicate; events that don't match are skipped.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter.
    ///
    /// Lagged errors are absorbed by skipping to the next available event;
    /// `RecvError::Closed` is returned to the caller.
    pub async fn next(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.as_ref().map_or(true, |f| f(&event)) {
                        return Ok(event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event stream lagged; continuing");
                }
                Err(err @ RecvError::Closed) => return Err(err),
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
