//! # Core Session Module
//!
//! The playback coordinator and its session surfaces: browse-request handling
//! with detach semantics, transport-control entry points, now-playing
//! notification content, and session lifecycle/cancellation.
//!
//! ## Overview
//!
//! A hosting media-session service constructs one [`PlaybackCoordinator`]
//! per session, calls [`PlaybackCoordinator::start`] to kick off the one-shot
//! catalog load, and funnels every transport callback (browse, play-from-id,
//! play/pause, skip, seek) into it. UI observers subscribe to the session's
//! [`EventBus`](core_runtime::events::EventBus) instead of reaching into
//! coordinator state.

pub mod browse;
pub mod coordinator;
pub mod error;
pub mod notification;

pub use browse::{BrowseError, BrowseResponder, BrowseResult, MediaItem};
pub use coordinator::PlaybackCoordinator;
pub use error::{Result, SessionError};
pub use notification::{NotificationBuilder, NotificationContent, NowPlaying};

#[cfg(feature = "firestore")]
pub use provider_firestore::FirestoreCatalogProvider;
