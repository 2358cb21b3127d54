//! # Readiness-Gated Catalog Source
//!
//! [`CatalogSource`] combines the in-memory track catalog with the readiness
//! gate that browse and prepare operations synchronize on. One load cycle
//! walks the gate forward:
//!
//! ```text
//! Created ──▶ Initializing ──▶ { Initialized | Error }
//! ```
//!
//! `Initialized` and `Error` are terminal for the cycle. Callbacks registered
//! through [`CatalogSource::when_ready`] while the gate is non-terminal are
//! queued and drained exactly once, in registration order, when the gate
//! reaches a terminal state. A callback registered after the terminal
//! transition is invoked synchronously within the registering call.
//!
//! ## Locking
//!
//! State, pending callbacks, and the track list share a single
//! mutual-exclusion domain: fetch completion (background task) and
//! browse/prepare requests (transport callbacks) race on the same fields.
//! The remote fetch itself runs outside the lock; only snapshot reads,
//! callback registration, and the terminal store-and-drain run inside it.
//!
//! Pending callbacks are drained while the lock is held, so a callback must
//! not call back into the source it was registered on. Callbacks that need
//! to touch the source should hand off to a channel or task instead.

use crate::error::Result as CatalogResult;
use crate::provider::CatalogProvider;
use crate::track::Track;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Readiness of the catalog source within one load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessState {
    /// No load cycle has started yet.
    Created,
    /// A load cycle is in flight.
    Initializing,
    /// The cycle completed and the catalog snapshot is current.
    Initialized,
    /// The cycle failed; the catalog snapshot is not usable.
    Error,
}

impl ReadinessState {
    /// Returns `true` for states that end a load cycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, ReadinessState::Initialized | ReadinessState::Error)
    }

    fn rank(self) -> u8 {
        match self {
            ReadinessState::Created => 0,
            ReadinessState::Initializing => 1,
            ReadinessState::Initialized | ReadinessState::Error => 2,
        }
    }
}

/// Callback registered by a consumer that observed a non-terminal state.
///
/// Invoked exactly once with `true` iff the cycle ended `Initialized`.
type ReadyCallback = Box<dyn FnOnce(bool) + Send>;

struct Inner {
    state: ReadinessState,
    pending: Vec<ReadyCallback>,
    tracks: Vec<Track>,
}

/// Readiness-gated, in-memory catalog of tracks.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct CatalogSource {
    inner: Mutex<Inner>,
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogSource {
    /// Create a source in the `Created` state with an empty catalog.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: ReadinessState::Created,
                pending: Vec::new(),
                tracks: Vec::new(),
            }),
        }
    }

    /// Current gate state.
    pub fn state(&self) -> ReadinessState {
        self.inner.lock().state
    }

    /// `true` once the current cycle ended `Initialized`.
    pub fn is_ready(&self) -> bool {
        self.inner.lock().state == ReadinessState::Initialized
    }

    /// Snapshot of the current catalog, in store order.
    ///
    /// The snapshot does not update when the catalog is replaced.
    pub fn tracks(&self) -> Vec<Track> {
        self.inner.lock().tracks.clone()
    }

    /// Number of tracks in the current catalog.
    pub fn track_count(&self) -> usize {
        self.inner.lock().tracks.len()
    }

    /// First track whose `media_id` matches, if any.
    pub fn find(&self, media_id: &str) -> Option<Track> {
        self.inner
            .lock()
            .tracks
            .iter()
            .find(|track| track.media_id == media_id)
            .cloned()
    }

    /// Register `callback` to run when the current cycle ends.
    ///
    /// Returns `false` when the gate is non-terminal: the callback was queued
    /// and the caller must wait for asynchronous delivery (a browse request
    /// detaches its response channel on this path). Returns `true` when the
    /// gate is already terminal: the callback ran synchronously within this
    /// call with `true` iff the state is `Initialized`.
    ///
    /// A registration racing a terminal transition either joins the drain or
    /// runs synchronously after it; it is never dropped or invoked twice.
    pub fn when_ready<F>(&self, callback: F) -> bool
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let success = {
            let mut inner = self.inner.lock();
            if !inner.state.is_terminal() {
                inner.pending.push(Box::new(callback));
                return false;
            }
            inner.state == ReadinessState::Initialized
        };
        // Terminal path: run outside the lock so the callback may re-enter
        // the source (e.g. to snapshot tracks).
        callback(success);
        true
    }

    /// Move the gate to `next`.
    ///
    /// Transitions are monotonic within a cycle; a backwards or
    /// terminal-to-terminal transition is rejected (and logged) rather than
    /// applied. Use [`CatalogSource::begin_cycle`] to start a fresh cycle
    /// from a terminal state.
    ///
    /// A terminal `next` updates the state, drains every pending callback in
    /// registration order with `next == Initialized`, and clears the pending
    /// list, all inside one critical section.
    ///
    /// Returns `true` if the transition was applied.
    pub fn transition_to(&self, next: ReadinessState) -> bool {
        let mut inner = self.inner.lock();
        if next.rank() <= inner.state.rank() {
            warn!(from = ?inner.state, to = ?next, "rejected readiness transition");
            return false;
        }
        if next.is_terminal() {
            Self::finish_cycle(&mut inner, next);
        } else {
            inner.state = next;
        }
        true
    }

    /// Start a fresh load cycle.
    ///
    /// From `Created` or a terminal state this moves the gate to
    /// `Initializing` and returns `true`. While a cycle is already in flight
    /// it returns `false`. Callbacks from a previous cycle were drained at
    /// its terminal transition, so no registrations carry across cycles.
    pub fn begin_cycle(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state == ReadinessState::Initializing {
            return false;
        }
        inner.state = ReadinessState::Initializing;
        true
    }

    /// Run one full load cycle against `provider`.
    ///
    /// Fetch failures degrade to an empty catalog and the cycle still ends
    /// `Initialized`; consumers cannot distinguish "store is empty" from
    /// "store was unreachable" through the gate. The session layer turns an
    /// empty ready catalog into an explicit network-error signal instead of
    /// an empty browse success.
    ///
    /// If a cycle is already in flight the call is a no-op. The provider
    /// call runs outside the lock; storing the result and draining callbacks
    /// share one critical section.
    ///
    /// Returns the number of tracks in the stored catalog.
    pub async fn load(&self, provider: &dyn CatalogProvider) -> usize {
        if !self.begin_cycle() {
            debug!("catalog load already in flight; skipping");
            return self.track_count();
        }

        let tracks = match provider.fetch_catalog().await {
            Ok(tracks) => tracks,
            Err(err) => {
                warn!(error = %err, "catalog fetch failed; storing empty catalog");
                Vec::new()
            }
        };

        let mut inner = self.inner.lock();
        inner.tracks = tracks;
        let count = inner.tracks.len();
        Self::finish_cycle(&mut inner, ReadinessState::Initialized);
        debug!(track_count = count, "catalog load cycle finished");
        count
    }

    /// Variant of [`CatalogSource::load`] that surfaces fetch failures as the
    /// `Error` terminal state instead of absorbing them.
    ///
    /// Kept alongside the default policy so hosts that want to distinguish
    /// "empty" from "failed" can opt in; pending callbacks then drain with
    /// `false`.
    pub async fn load_strict(&self, provider: &dyn CatalogProvider) -> CatalogResult<usize> {
        if !self.begin_cycle() {
            debug!("catalog load already in flight; skipping");
            return Ok(self.track_count());
        }

        match provider.fetch_catalog().await {
            Ok(tracks) => {
                let mut inner = self.inner.lock();
                inner.tracks = tracks;
                let count = inner.tracks.len();
                Self::finish_cycle(&mut inner, ReadinessState::Initialized);
                Ok(count)
            }
            Err(err) => {
                let mut inner = self.inner.lock();
                inner.tracks.clear();
                Self::finish_cycle(&mut inner, ReadinessState::Error);
                Err(err)
            }
        }
    }

    /// Terminal store-and-drain. Caller holds the lock.
    fn finish_cycle(inner: &mut Inner, terminal: ReadinessState) {
        debug_assert!(terminal.is_terminal());
        inner.state = terminal;
        let success = terminal == ReadinessState::Initialized;
        for callback in inner.pending.drain(..) {
            callback(success);
        }
    }
}

impl std::fmt::Debug for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("CatalogSource")
            .field("state", &inner.state)
            .field("pending", &inner.pending.len())
            .field("tracks", &inner.tracks.len())
            .finish()
    }
}
