//! Integration tests for the playback coordinator.
//!
//! These tests drive the coordinator with a recording mock engine and
//! scripted catalog providers, covering:
//! - Queue construction and start-index selection on prepare
//! - Toggle-vs-switch handling of play requests
//! - Serialization of concurrent prepare batches
//! - Browse gating: synchronous replies, detached replies, empty-catalog
//!   error asymmetry
//! - Session shutdown semantics

use async_trait::async_trait;
use core_catalog::{CatalogError, CatalogProvider, ReadinessState, Track};
use core_playback::{PlaybackQueue, PlayerController, PlayerState};
use core_runtime::config::SessionConfig;
use core_runtime::events::{CoreEvent, SessionEvent};
use core_session::{BrowseError, BrowseResponder, PlaybackCoordinator, SessionError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Implementations
// ============================================================================

fn track(id: &str) -> Track {
    Track {
        media_id: id.to_string(),
        title: format!("Title {id}"),
        subtitle: "Artist".to_string(),
        image_url: format!("https://art.example.com/{id}.jpg"),
        media_uri: format!("https://cdn.example.com/{id}.mp3"),
    }
}

fn config() -> SessionConfig {
    SessionConfig::builder()
        .project_id("demo-project")
        .song_collection("songs")
        .build()
        .unwrap()
}

/// Catalog provider returning a fixed track list.
struct FixedProvider(Vec<Track>);

#[async_trait]
impl CatalogProvider for FixedProvider {
    async fn fetch_catalog(&self) -> core_catalog::Result<Vec<Track>> {
        Ok(self.0.clone())
    }
}

/// Catalog provider that blocks until released, to exercise the detach path.
struct GatedProvider {
    tracks: Vec<Track>,
    release: Arc<Notify>,
}

#[async_trait]
impl CatalogProvider for GatedProvider {
    async fn fetch_catalog(&self) -> core_catalog::Result<Vec<Track>> {
        self.release.notified().await;
        Ok(self.tracks.clone())
    }
}

/// Catalog provider that always fails.
struct FailingProvider;

#[async_trait]
impl CatalogProvider for FailingProvider {
    async fn fetch_catalog(&self) -> core_catalog::Result<Vec<Track>> {
        Err(CatalogError::Fetch("connection refused".to_string()))
    }
}

/// One command observed by the mock engine.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    StopAndClear,
    SetQueue(Vec<String>),
    SeekTo(usize, u64),
    SetPlayWhenReady(bool),
    Pause,
    Resume,
}

/// Recording mock engine.
///
/// Each command yields to the scheduler before recording so that
/// interleaving between concurrent batches would actually show up in the
/// command log if the coordinator failed to serialize them.
struct MockPlayer {
    commands: Mutex<Vec<Command>>,
    prepared: AtomicBool,
    playing: AtomicBool,
    index: Mutex<Option<usize>>,
}

impl MockPlayer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            commands: Mutex::new(Vec::new()),
            prepared: AtomicBool::new(false),
            playing: AtomicBool::new(false),
            index: Mutex::new(None),
        })
    }

    fn log(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    async fn record(&self, command: Command) {
        tokio::task::yield_now().await;
        self.commands.lock().unwrap().push(command);
    }
}

#[async_trait]
impl PlayerController for MockPlayer {
    async fn stop_and_clear(&self) -> core_playback::Result<()> {
        self.record(Command::StopAndClear).await;
        self.prepared.store(false, Ordering::SeqCst);
        self.playing.store(false, Ordering::SeqCst);
        *self.index.lock().unwrap() = None;
        Ok(())
    }

    async fn set_queue(&self, queue: PlaybackQueue) -> core_playback::Result<()> {
        let ids = queue
            .entries
            .iter()
            .map(|entry| entry.media_id.clone())
            .collect();
        self.record(Command::SetQueue(ids)).await;
        Ok(())
    }

    async fn seek_to(&self, index: usize, position_ms: u64) -> core_playback::Result<()> {
        self.record(Command::SeekTo(index, position_ms)).await;
        *self.index.lock().unwrap() = Some(index);
        Ok(())
    }

    async fn set_play_when_ready(&self, play: bool) -> core_playback::Result<()> {
        self.record(Command::SetPlayWhenReady(play)).await;
        self.prepared.store(true, Ordering::SeqCst);
        self.playing.store(play, Ordering::SeqCst);
        Ok(())
    }

    async fn pause(&self) -> core_playback::Result<()> {
        self.record(Command::Pause).await;
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&self) -> core_playback::Result<()> {
        self.record(Command::Resume).await;
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn has_prepared_item(&self) -> bool {
        self.prepared.load(Ordering::SeqCst)
    }

    async fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    async fn current_index(&self) -> Option<usize> {
        *self.index.lock().unwrap()
    }

    async fn current_position_ms(&self) -> u64 {
        0
    }

    async fn current_duration_ms(&self) -> Option<u64> {
        if self.prepared.load(Ordering::SeqCst) {
            Some(180_000)
        } else {
            None
        }
    }

    async fn state(&self) -> PlayerState {
        if self.playing.load(Ordering::SeqCst) {
            PlayerState::Playing
        } else if self.prepared.load(Ordering::SeqCst) {
            PlayerState::Paused
        } else {
            PlayerState::Idle
        }
    }
}

async fn ready_coordinator(
    tracks: Vec<Track>,
) -> (Arc<PlaybackCoordinator>, Arc<MockPlayer>) {
    let player = MockPlayer::new();
    let provider = Arc::new(FixedProvider(tracks));
    let coordinator = PlaybackCoordinator::new(config(), provider.clone(), player.clone());
    coordinator.catalog().load(provider.as_ref()).await;
    (coordinator, player)
}

// ============================================================================
// Prepare / selection
// ============================================================================

#[tokio::test]
async fn select_second_track_prepares_full_queue_at_index_one() {
    let (coordinator, player) = ready_coordinator(vec![track("a"), track("b")]).await;
    assert!(coordinator.current_track().is_none());

    coordinator
        .select_and_prepare(track("b"), true)
        .await
        .unwrap();

    assert_eq!(
        player.log(),
        vec![
            Command::StopAndClear,
            Command::SetQueue(vec!["a".to_string(), "b".to_string()]),
            Command::SeekTo(1, 0),
            Command::SetPlayWhenReady(true),
        ]
    );
    assert_eq!(coordinator.current_track().unwrap().media_id, "b");
}

#[tokio::test]
async fn select_track_missing_from_catalog_fails() {
    let (coordinator, player) = ready_coordinator(vec![track("a")]).await;

    let err = coordinator
        .select_and_prepare(track("z"), true)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Playback(_)));
    assert!(player.log().is_empty());
}

#[tokio::test]
async fn prepare_from_unknown_media_id_is_a_silent_no_op() {
    let (coordinator, player) = ready_coordinator(vec![track("a")]).await;

    coordinator
        .prepare_from_media_id("missing", true)
        .await
        .unwrap();

    assert!(player.log().is_empty());
    assert!(coordinator.current_track().is_none());
}

#[tokio::test]
async fn concurrent_prepares_never_interleave_engine_commands() {
    let (coordinator, player) = ready_coordinator(vec![track("a"), track("b")]).await;

    let first = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.select_and_prepare(track("a"), true).await })
    };
    let second = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.select_and_prepare(track("b"), true).await })
    };
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let log = player.log();
    assert_eq!(log.len(), 8);
    for batch in log.chunks(4) {
        // Each batch is one request fully applied, in command order.
        assert_eq!(batch[0], Command::StopAndClear);
        assert!(matches!(batch[1], Command::SetQueue(_)));
        let index = match batch[2] {
            Command::SeekTo(index, 0) => index,
            ref other => panic!("expected seek, got {other:?}"),
        };
        assert_eq!(batch[3], Command::SetPlayWhenReady(true));
        assert!(index <= 1);
    }

    // The engine's final position matches whichever request ran last.
    let last_seek = match player.log()[6] {
        Command::SeekTo(index, _) => index,
        ref other => panic!("expected seek, got {other:?}"),
    };
    let final_selection = coordinator.current_track().unwrap();
    let expected = if last_seek == 0 { "a" } else { "b" };
    assert_eq!(final_selection.media_id, expected);
}

// ============================================================================
// Toggle vs switch
// ============================================================================

#[tokio::test]
async fn play_request_on_current_prepared_track_toggles_pause() {
    let (coordinator, player) = ready_coordinator(vec![track("a"), track("b")]).await;
    coordinator
        .select_and_prepare(track("a"), true)
        .await
        .unwrap();
    assert!(player.is_playing().await);

    coordinator.play_from_media_id("a").await.unwrap();

    assert_eq!(player.log().last(), Some(&Command::Pause));
    assert!(!player.is_playing().await);

    // A second play request on the same track resumes.
    coordinator.play_from_media_id("a").await.unwrap();
    assert_eq!(player.log().last(), Some(&Command::Resume));
    assert!(player.is_playing().await);
}

#[tokio::test]
async fn play_request_on_different_track_reprepares() {
    let (coordinator, player) = ready_coordinator(vec![track("a"), track("b")]).await;
    coordinator
        .select_and_prepare(track("a"), true)
        .await
        .unwrap();

    coordinator.play_from_media_id("b").await.unwrap();

    let log = player.log();
    assert_eq!(
        log[log.len() - 4..].to_vec(),
        vec![
            Command::StopAndClear,
            Command::SetQueue(vec!["a".to_string(), "b".to_string()]),
            Command::SeekTo(1, 0),
            Command::SetPlayWhenReady(true),
        ]
    );
    assert_eq!(coordinator.current_track().unwrap().media_id, "b");
}

// ============================================================================
// Skip / seek
// ============================================================================

#[tokio::test]
async fn skip_moves_through_the_queue_preserving_play_state() {
    let (coordinator, player) =
        ready_coordinator(vec![track("a"), track("b"), track("c")]).await;
    coordinator
        .select_and_prepare(track("a"), true)
        .await
        .unwrap();

    coordinator.skip_to_next().await.unwrap();
    assert_eq!(coordinator.current_track().unwrap().media_id, "b");
    assert_eq!(player.current_index().await, Some(1));
    assert!(player.is_playing().await);

    coordinator.skip_to_previous().await.unwrap();
    assert_eq!(coordinator.current_track().unwrap().media_id, "a");

    // Skipping past the queue start changes nothing.
    let before = player.log().len();
    coordinator.skip_to_previous().await.unwrap();
    assert_eq!(player.log().len(), before);
}

#[tokio::test]
async fn seek_reports_position_and_duration() {
    let (coordinator, player) = ready_coordinator(vec![track("a")]).await;
    coordinator
        .select_and_prepare(track("a"), false)
        .await
        .unwrap();

    coordinator.seek_to_position(42_000).await.unwrap();

    assert_eq!(player.log().last(), Some(&Command::SeekTo(0, 42_000)));
    assert_eq!(coordinator.current_duration_ms().await, Some(180_000));

    let now = coordinator.now_playing().await.unwrap();
    assert_eq!(now.track.media_id, "a");
    assert_eq!(now.duration_ms, Some(180_000));
    assert!(!now.is_playing);
}

// ============================================================================
// Browse gating
// ============================================================================

#[tokio::test]
async fn browse_after_ready_completes_synchronously() {
    let (coordinator, player) = ready_coordinator(vec![track("a"), track("b")]).await;

    let (responder, rx) = BrowseResponder::channel();
    let synchronous = coordinator.handle_browse("root_id", responder).await;

    assert!(synchronous);
    let items = rx.await.unwrap().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].media_id, "a");
    assert!(items[0].playable);

    // First browse primed the engine on the queue head without playing.
    assert_eq!(
        player.log(),
        vec![
            Command::StopAndClear,
            Command::SetQueue(vec!["a".to_string(), "b".to_string()]),
            Command::SeekTo(0, 0),
            Command::SetPlayWhenReady(false),
        ]
    );

    // Second browse does not re-prepare.
    let before = player.log().len();
    let (responder, rx) = BrowseResponder::channel();
    coordinator.handle_browse("root_id", responder).await;
    rx.await.unwrap().unwrap();
    assert_eq!(player.log().len(), before);
}

#[tokio::test]
async fn browse_before_ready_detaches_and_completes_after_load() {
    let player = MockPlayer::new();
    let release = Arc::new(Notify::new());
    let provider = Arc::new(GatedProvider {
        tracks: vec![track("a")],
        release: Arc::clone(&release),
    });
    let coordinator = PlaybackCoordinator::new(config(), provider, player.clone());
    coordinator.start();

    // The load is parked inside the provider; the browse must detach.
    let (responder, rx) = BrowseResponder::channel();
    let synchronous = coordinator.handle_browse("root_id", responder).await;
    assert!(!synchronous);
    assert_ne!(coordinator.readiness(), ReadinessState::Initialized);

    release.notify_one();

    let items = rx.await.unwrap().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(coordinator.readiness(), ReadinessState::Initialized);
}

#[tokio::test]
async fn browse_of_unknown_parent_is_rejected() {
    let (coordinator, _player) = ready_coordinator(vec![track("a")]).await;

    let (responder, rx) = BrowseResponder::channel();
    let synchronous = coordinator.handle_browse("somewhere_else", responder).await;

    assert!(synchronous);
    assert_eq!(
        rx.await.unwrap(),
        Err(BrowseError::UnknownParent("somewhere_else".to_string()))
    );
}

#[tokio::test]
async fn empty_ready_catalog_surfaces_network_error_not_empty_success() {
    let player = MockPlayer::new();
    let provider = Arc::new(FailingProvider);
    let coordinator = PlaybackCoordinator::new(config(), provider.clone(), player.clone());
    let mut events = coordinator.events().subscribe();

    // The documented load policy absorbs the failure into an empty
    // Initialized catalog.
    coordinator.catalog().load(provider.as_ref()).await;
    assert_eq!(coordinator.readiness(), ReadinessState::Initialized);

    let (responder, rx) = BrowseResponder::channel();
    coordinator.handle_browse("root_id", responder).await;

    assert!(matches!(rx.await.unwrap(), Err(BrowseError::Unavailable(_))));
    let mut saw_network_error = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, CoreEvent::Session(SessionEvent::NetworkError { .. })) {
            saw_network_error = true;
        }
    }
    assert!(saw_network_error);
    assert!(player.log().is_empty());
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn shutdown_stops_engine_and_rejects_later_requests() {
    let (coordinator, player) = ready_coordinator(vec![track("a")]).await;
    coordinator
        .select_and_prepare(track("a"), true)
        .await
        .unwrap();

    coordinator.shutdown().await;
    assert_eq!(player.log().last(), Some(&Command::StopAndClear));
    assert!(!player.is_playing().await);

    let err = coordinator
        .select_and_prepare(track("a"), true)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::ShutDown));

    // Idempotent: no second stop command.
    let before = player.log().len();
    coordinator.shutdown().await;
    assert_eq!(player.log().len(), before);
}

#[tokio::test]
async fn reload_runs_a_fresh_gate_cycle() {
    let (coordinator, _player) = ready_coordinator(vec![track("a")]).await;
    assert_eq!(coordinator.catalog().track_count(), 1);

    // `load` starts a fresh cycle itself when the gate is terminal.
    let provider = Arc::new(FixedProvider(vec![track("b"), track("c")]));
    coordinator.catalog().load(provider.as_ref()).await;

    assert_eq!(coordinator.readiness(), ReadinessState::Initialized);
    assert_eq!(coordinator.catalog().track_count(), 2);
    assert!(coordinator.catalog().find("a").is_none());
}
