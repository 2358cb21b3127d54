//! # Playback Coordinator
//!
//! Orchestrates the catalog load, the readiness gate, queue construction,
//! and the playback engine in response to transport requests.
//!
//! ## Overview
//!
//! The `PlaybackCoordinator` is the session's central orchestrator. It:
//! - Triggers the asynchronous one-shot catalog load on [`start`](PlaybackCoordinator::start)
//! - Gates every browse and prepare request behind the catalog readiness gate
//! - Owns the current track selection and the current-item duration state
//! - Issues engine command batches (stop-and-clear, set queue, seek, play
//!   flag) as one serialized logical unit per selection
//! - Emits typed events for UI observers via the [`EventBus`]
//! - Cancels all background work as a unit on [`shutdown`](PlaybackCoordinator::shutdown)
//!
//! ## Request flow
//!
//! ```text
//! browse ──▶ when_ready ──▶ sync reply            (gate terminal)
//!                      └──▶ detached reply        (gate still loading)
//! play-from-id ──▶ gate-wait ──▶ lookup ──▶ toggle | select_and_prepare
//! ```
//!
//! ## Concurrency
//!
//! Concurrent `select_and_prepare` calls never interleave their engine
//! commands: each batch runs under the coordinator's prepare lock, so the
//! engine's final state always reflects exactly one request fully applied.

use crate::browse::{BrowseError, BrowseResponder, MediaItem};
use crate::error::{Result, SessionError};
use crate::notification::NowPlaying;
use core_catalog::{CatalogProvider, CatalogSource, ReadinessState, Track};
use core_playback::{build_queue, start_index, PlaybackError, PlayerController};
use core_runtime::config::{SessionConfig, NETWORK_ERROR_EVENT};
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus, PlayerEvent, SessionEvent};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Mutable selection state, all behind one short-lived lock.
struct SelectionState {
    /// Track last explicitly requested to play; `None` until a selection.
    current: Option<Track>,
    /// Duration of the engine's current item, cached from the engine.
    duration_ms: Option<u64>,
    /// Whether the first-browse auto-prepare has already run this cycle.
    auto_prepared: bool,
}

/// Session-scoped orchestrator of catalog, gate, queue, and engine.
///
/// Constructed as an `Arc` so browse detachment and the background load can
/// hold handles; lives as long as the hosting session.
pub struct PlaybackCoordinator {
    id: Uuid,
    config: SessionConfig,
    source: Arc<CatalogSource>,
    provider: Arc<dyn CatalogProvider>,
    player: Arc<dyn PlayerController>,
    events: EventBus,
    /// Serializes whole engine command batches, never individual commands.
    prepare_lock: AsyncMutex<()>,
    selection: Mutex<SelectionState>,
    cancel: CancellationToken,
    shut_down: AtomicBool,
}

impl PlaybackCoordinator {
    /// Create a coordinator for one session.
    pub fn new(
        config: SessionConfig,
        provider: Arc<dyn CatalogProvider>,
        player: Arc<dyn PlayerController>,
    ) -> Arc<Self> {
        let events = EventBus::new(config.event_buffer_size);
        Arc::new(Self {
            id: Uuid::new_v4(),
            config,
            source: Arc::new(CatalogSource::new()),
            provider,
            player,
            events,
            prepare_lock: AsyncMutex::new(()),
            selection: Mutex::new(SelectionState {
                current: None,
                duration_ms: None,
                auto_prepared: false,
            }),
            cancel: CancellationToken::new(),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Identifier of this session, carried in log output.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The session's event bus; UI observers subscribe here.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// The readiness-gated catalog source backing this session.
    pub fn catalog(&self) -> &Arc<CatalogSource> {
        &self.source
    }

    /// Current gate state.
    pub fn readiness(&self) -> ReadinessState {
        self.source.state()
    }

    /// Snapshot of the current selection, if any.
    pub fn current_track(&self) -> Option<Track> {
        self.selection.lock().current.clone()
    }

    /// Kick off the asynchronous catalog load.
    ///
    /// The load runs once per cycle; a call while a load is in flight is a
    /// no-op inside the source. The spawned task is tied to the session's
    /// cancellation token.
    pub fn start(self: &Arc<Self>) {
        if self.shut_down.load(Ordering::SeqCst) {
            warn!("start called on a shut-down session");
            return;
        }
        self.events
            .emit(CoreEvent::Catalog(CatalogEvent::LoadStarted))
            .ok();

        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = this.cancel.cancelled() => {
                    debug!("catalog load cancelled");
                }
                count = this.source.load(this.provider.as_ref()) => {
                    info!(session_id = %this.id, track_count = count, "catalog ready");
                    this.events
                        .emit(CoreEvent::Catalog(CatalogEvent::Ready { track_count: count }))
                        .ok();
                }
            }
        });
    }

    /// Re-fetch the catalog in a fresh gate cycle.
    ///
    /// The current selection is kept; the first-browse auto-prepare latch is
    /// re-armed so a browse against the new catalog primes the engine again.
    pub fn reload(self: &Arc<Self>) {
        self.selection.lock().auto_prepared = false;
        self.start();
    }

    /// Record `track` as the current selection and prepare the engine on it.
    ///
    /// Issues, in order and without interleaving from concurrent calls:
    /// stop-and-clear, set queue, seek to the track's index at offset 0, set
    /// the play-when-ready flag.
    pub async fn select_and_prepare(&self, track: Track, play_now: bool) -> Result<()> {
        let _batch = self.prepare_lock.lock().await;
        self.ensure_running()?;

        let tracks = self.source.tracks();
        let index = start_index(&tracks, Some(&track))
            .ok_or_else(|| PlaybackError::TrackNotFound(track.media_id.clone()))?;
        let queue = build_queue(&tracks);

        {
            let mut selection = self.selection.lock();
            selection.current = Some(track.clone());
            selection.duration_ms = None;
        }

        self.player.stop_and_clear().await.map_err(SessionError::from)?;
        self.player.set_queue(queue).await.map_err(SessionError::from)?;
        self.player.seek_to(index, 0).await.map_err(SessionError::from)?;
        self.player
            .set_play_when_ready(play_now)
            .await
            .map_err(SessionError::from)?;

        debug!(media_id = %track.media_id, index, play_now, "prepared selection");
        self.events
            .emit(CoreEvent::Session(SessionEvent::SelectionChanged {
                media_id: track.media_id.clone(),
                title: track.title.clone(),
            }))
            .ok();
        self.events
            .emit(CoreEvent::Player(PlayerEvent::Prepared {
                media_id: track.media_id,
                start_index: index,
                play_now,
            }))
            .ok();
        Ok(())
    }

    /// Handle a browse request against `parent_id`.
    ///
    /// Returns `true` when the reply completed within this call and `false`
    /// when the responder was detached for asynchronous completion once the
    /// gate settles, mirroring the gate's `when_ready` contract.
    pub async fn handle_browse(
        self: &Arc<Self>,
        parent_id: &str,
        responder: BrowseResponder,
    ) -> bool {
        if parent_id != self.config.media_root_id {
            responder.complete(Err(BrowseError::UnknownParent(parent_id.to_string())));
            return true;
        }

        // Bridge the gate callback over a oneshot so the completion logic
        // never runs inside the gate's critical section.
        let (tx, rx) = oneshot::channel();
        let synchronous = self.source.when_ready(move |ok| {
            let _ = tx.send(ok);
        });

        if synchronous {
            let ready = rx.await.unwrap_or(false);
            self.complete_browse(ready, responder).await;
            true
        } else {
            debug!("browse detached pending catalog load");
            let this = Arc::clone(self);
            tokio::spawn(async move {
                tokio::select! {
                    _ = this.cancel.cancelled() => {
                        responder.complete(Err(BrowseError::Cancelled));
                    }
                    ready = rx => {
                        this.complete_browse(ready.unwrap_or(false), responder).await;
                    }
                }
            });
            false
        }
    }

    async fn complete_browse(&self, ready_ok: bool, responder: BrowseResponder) {
        if !ready_ok {
            self.emit_network_error("catalog load failed");
            responder.complete(Err(BrowseError::Unavailable(
                "catalog load failed".to_string(),
            )));
            return;
        }

        let tracks = self.source.tracks();
        if tracks.is_empty() {
            // Ready-but-empty is surfaced as a network error, never as an
            // empty success.
            self.emit_network_error("catalog is empty");
            responder.complete(Err(BrowseError::Unavailable(
                "catalog is empty".to_string(),
            )));
            return;
        }

        let items: Vec<MediaItem> = tracks.iter().map(MediaItem::from).collect();

        let should_prepare = {
            let mut selection = self.selection.lock();
            if selection.auto_prepared {
                false
            } else {
                selection.auto_prepared = true;
                true
            }
        };
        if should_prepare {
            // Prime the engine on the queue head without starting playback.
            if let Err(err) = self.prepare_initial(&tracks).await {
                warn!(error = %err, "initial prepare failed");
            }
        }

        responder.complete(Ok(items));
    }

    /// Prepare the queue head with no selection recorded and playback held.
    async fn prepare_initial(&self, tracks: &[Track]) -> Result<()> {
        let _batch = self.prepare_lock.lock().await;
        self.ensure_running()?;

        let index = start_index(tracks, None).unwrap_or(0);
        let queue = build_queue(tracks);
        let head_id = queue
            .get(index)
            .map(|entry| entry.media_id.clone())
            .unwrap_or_default();

        self.player.stop_and_clear().await.map_err(SessionError::from)?;
        self.player.set_queue(queue).await.map_err(SessionError::from)?;
        self.player.seek_to(index, 0).await.map_err(SessionError::from)?;
        self.player
            .set_play_when_ready(false)
            .await
            .map_err(SessionError::from)?;

        self.events
            .emit(CoreEvent::Player(PlayerEvent::Prepared {
                media_id: head_id,
                start_index: index,
                play_now: false,
            }))
            .ok();
        Ok(())
    }

    /// Wait on the gate, look up `media_id`, and prepare it if found.
    ///
    /// An unknown media id changes nothing and is only logged.
    pub async fn prepare_from_media_id(&self, media_id: &str, play_now: bool) -> Result<()> {
        let ready = self.await_ready().await;
        if !ready {
            debug!("gate ended in error state before prepare");
        }
        match self.source.find(media_id) {
            Some(track) => self.select_and_prepare(track, play_now).await,
            None => {
                warn!(media_id, "prepare requested for unknown media id; ignoring");
                Ok(())
            }
        }
    }

    /// Transport "play" entry point: toggle or switch.
    ///
    /// A request targeting the current selection while the engine holds a
    /// prepared item toggles pause/resume; anything else re-prepares with
    /// playback starting immediately.
    pub async fn play_from_media_id(&self, media_id: &str) -> Result<()> {
        let targets_current = self
            .selection
            .lock()
            .current
            .as_ref()
            .map(|track| track.media_id == media_id)
            .unwrap_or(false);

        if targets_current && self.player.has_prepared_item().await {
            self.toggle_playback().await
        } else {
            self.prepare_from_media_id(media_id, true).await
        }
    }

    /// Pause when playing, resume when paused.
    pub async fn toggle_playback(&self) -> Result<()> {
        self.ensure_running()?;
        let media_id = self
            .current_track()
            .map(|track| track.media_id)
            .unwrap_or_default();

        if self.player.is_playing().await {
            self.player.pause().await.map_err(SessionError::from)?;
            self.events
                .emit(CoreEvent::Player(PlayerEvent::Paused { media_id }))
                .ok();
        } else {
            self.player.resume().await.map_err(SessionError::from)?;
            self.events
                .emit(CoreEvent::Player(PlayerEvent::Playing { media_id }))
                .ok();
        }
        Ok(())
    }

    /// Skip to the next queue item, keeping the current play/pause state.
    pub async fn skip_to_next(&self) -> Result<()> {
        self.skip(1).await
    }

    /// Skip to the previous queue item, keeping the current play/pause state.
    pub async fn skip_to_previous(&self) -> Result<()> {
        self.skip(-1).await
    }

    async fn skip(&self, delta: i64) -> Result<()> {
        let Some(index) = self.player.current_index().await else {
            warn!("skip requested with nothing prepared; ignoring");
            return Ok(());
        };
        let tracks = self.source.tracks();
        let target = index as i64 + delta;
        if target < 0 || target as usize >= tracks.len() {
            debug!(target, "skip target out of range; ignoring");
            return Ok(());
        }
        let was_playing = self.player.is_playing().await;
        self.select_and_prepare(tracks[target as usize].clone(), was_playing)
            .await
    }

    /// Seek within the current item.
    pub async fn seek_to_position(&self, position_ms: u64) -> Result<()> {
        self.ensure_running()?;
        let index = self.player.current_index().await.unwrap_or(0);
        self.player
            .seek_to(index, position_ms)
            .await
            .map_err(SessionError::from)?;
        let duration_ms = self.refresh_duration().await;
        self.events
            .emit(CoreEvent::Player(PlayerEvent::PositionChanged {
                position_ms,
                duration_ms,
            }))
            .ok();
        Ok(())
    }

    /// Snapshot of what is currently selected and where the engine is.
    ///
    /// `None` until a track has been explicitly selected.
    pub async fn now_playing(&self) -> Option<NowPlaying> {
        let track = self.selection.lock().current.clone()?;
        let duration_ms = self.refresh_duration().await;
        Some(NowPlaying {
            track,
            duration_ms,
            position_ms: self.player.current_position_ms().await,
            is_playing: self.player.is_playing().await,
        })
    }

    /// Duration of the engine's current item, cached on the coordinator so
    /// notification and UI surfaces read session state instead of a global.
    pub async fn current_duration_ms(&self) -> Option<u64> {
        self.refresh_duration().await
    }

    /// Cancel background work, stop the engine, and close the session.
    ///
    /// Idempotent; later transport requests fail with
    /// [`SessionError::ShutDown`].
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(session_id = %self.id, "shutting down session");
        self.cancel.cancel();
        if let Err(err) = self.player.stop_and_clear().await {
            warn!(error = %err, "engine stop during shutdown failed");
        }
        self.events
            .emit(CoreEvent::Session(SessionEvent::Shutdown))
            .ok();
    }

    async fn await_ready(&self) -> bool {
        let (tx, rx) = oneshot::channel();
        self.source.when_ready(move |ok| {
            let _ = tx.send(ok);
        });
        rx.await.unwrap_or(false)
    }

    async fn refresh_duration(&self) -> Option<u64> {
        let duration = self.player.current_duration_ms().await;
        self.selection.lock().duration_ms = duration;
        duration
    }

    fn emit_network_error(&self, message: &str) {
        warn!(event = NETWORK_ERROR_EVENT, message, "catalog unavailable");
        self.events
            .emit(CoreEvent::Session(SessionEvent::NetworkError {
                message: message.to_string(),
            }))
            .ok();
    }

    fn ensure_running(&self) -> Result<()> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(SessionError::ShutDown);
        }
        Ok(())
    }
}

impl std::fmt::Debug for PlaybackCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackCoordinator")
            .field("id", &self.id)
            .field("readiness", &self.source.state())
            .field(
                "selection",
                &self.selection.lock().current.as_ref().map(|t| t.media_id.clone()),
            )
            .field("shut_down", &self.shut_down.load(Ordering::SeqCst))
            .finish()
    }
}
