//! Playback session controller.
//!
//! The controller owns the session lifecycle: it validates and dispatches
//! queries, arms the timeline, drives it with the playback clock, and swaps
//! the console's telemetry stream between live and historical sources.
//!
//! ## Propagation policy
//!
//! Only validation and transition errors surface to the caller. Every
//! backend request is dispatched fire-and-forget on a detached task with the
//! outcome logged and discarded; a telemetry console must keep functioning
//! when its backend does not. Stream swaps are awaited so the swap outcome
//! is settled before the operation returns, but a failed swap likewise only
//! logs and leaves the console without a stream.
//!
//! ## Ordering
//!
//! Session start and teardown follow a fixed protocol order. Starting:
//! query dispatch, then the `playback:on` event, then the stream swap, then
//! the armed state. Tearing down: clock stop, then abort dispatch, then
//! `playback:off`, then the swap back to live, then idle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use crate::Result;
use crate::backend::PlaybackBackend;
use crate::clock::PlaybackClock;
use crate::error::PlaybackError;
use crate::events::{EventBus, PlaybackEvent};
use crate::streaming::{StreamGateway, StreamMode};
use crate::types::{PlaybackQuery, QueryInput, SessionState, WireTimestamp};
use crate::validate;

/// Timeline bounds and position for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    /// Tick index of the window start.
    pub start_ticks: u64,
    /// Tick index of the window end.
    pub end_ticks: u64,
    /// Ticks consumed since the session was armed.
    pub position: u64,
}

/// Snapshot of the armed session for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSession {
    /// The validated query the session was armed with.
    pub query: PlaybackQuery,
    /// The timeline instant most recently shown.
    pub current_time: Option<WireTimestamp>,
    /// Lifecycle state at the moment of the snapshot.
    pub state: SessionState,
}

/// State of one armed session.
///
/// The position survives pause and resume; only an abort discards it.
struct SessionHandle {
    query: PlaybackQuery,
    position: Arc<AtomicU64>,
}

/// Drives playback sessions against a backend and a stream gateway.
pub struct PlaybackController<B, G>
where
    B: PlaybackBackend,
    G: StreamGateway,
{
    backend: Arc<B>,
    gateway: Arc<G>,
    events: EventBus,
    clock: PlaybackClock,
    session: Option<SessionHandle>,
    stream: Option<G::Session>,
    state_tx: watch::Sender<SessionState>,
    current_tx: watch::Sender<Option<WireTimestamp>>,
}

impl<B, G> PlaybackController<B, G>
where
    B: PlaybackBackend,
    G: StreamGateway,
{
    /// Create an idle controller.
    pub fn new(backend: Arc<B>, gateway: Arc<G>, events: EventBus, clock: PlaybackClock) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        let (current_tx, _) = watch::channel(None);
        Self {
            backend,
            gateway,
            events,
            clock,
            session: None,
            stream: None,
            state_tx,
            current_tx,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Watch lifecycle state changes.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Lifecycle states as a stream, starting with the current state.
    pub fn state_updates(&self) -> impl Stream<Item = SessionState> + 'static {
        WatchStream::new(self.state_tx.subscribe())
    }

    /// The timeline instant most recently shown, if a session exists.
    pub fn current_time(&self) -> Option<WireTimestamp> {
        self.current_tx.borrow().clone()
    }

    /// Watch the displayed timeline instant.
    pub fn watch_current_time(&self) -> watch::Receiver<Option<WireTimestamp>> {
        self.current_tx.subscribe()
    }

    /// The active session's query, if one is armed.
    pub fn session_query(&self) -> Option<&PlaybackQuery> {
        self.session.as_ref().map(|session| &session.query)
    }

    /// Snapshot of the armed session, if one exists.
    pub fn session(&self) -> Option<PlaybackSession> {
        let handle = self.session.as_ref()?;
        Some(PlaybackSession {
            query: handle.query.clone(),
            current_time: self.current_tx.borrow().clone(),
            state: *self.state_tx.borrow(),
        })
    }

    /// Ticks consumed since the session was armed, if one exists.
    pub fn position(&self) -> Option<u64> {
        self.session.as_ref().map(|session| session.position.load(Ordering::SeqCst))
    }

    /// Timeline bounds and position for display, if a session exists.
    pub fn timeline(&self) -> Option<Timeline> {
        let session = self.session.as_ref()?;
        Some(Timeline {
            start_ticks: session.query.start_ticks().ok()?,
            end_ticks: session.query.end_ticks().ok()?,
            position: session.position.load(Ordering::SeqCst),
        })
    }

    /// The lifecycle event bus.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// The active telemetry stream, if the last swap succeeded.
    pub fn stream(&self) -> Option<&G::Session> {
        self.stream.as_ref()
    }

    /// Validate a query and arm a playback session for it.
    ///
    /// On success the query is dispatched to the backend, `playback:on` is
    /// published, the telemetry stream is swapped to the historical source,
    /// and the session arms with its position at zero and the displayed
    /// instant at the window start. Validation failures and submissions
    /// while a session already exists are rejected; backend and stream
    /// failures are not.
    pub async fn submit(&mut self, input: &QueryInput) -> Result<()> {
        let state = self.state();
        if state != SessionState::Idle {
            return Err(PlaybackError::InvalidTransition { state, action: "submit" });
        }

        let query = validate::checked_query(input)?;
        self.advance_state(SessionState::Querying);

        let backend = Arc::clone(&self.backend);
        let dispatch = query.clone();
        tokio::spawn(async move {
            if let Err(err) = backend.begin_playback(&dispatch).await {
                debug!(error = %err, "playback query dispatch failed");
            }
        });

        self.events.publish(PlaybackEvent::On);
        self.swap_stream(StreamMode::Playback).await;

        self.current_tx.send_replace(Some(query.start.clone()));
        self.session = Some(SessionHandle { query, position: Arc::new(AtomicU64::new(0)) });
        self.advance_state(SessionState::Armed);
        Ok(())
    }

    /// Start or resume timeline advancement.
    ///
    /// Each tick increments the position and renders it as a wire timestamp.
    /// While the stamp is within the window's end bound it becomes the
    /// displayed instant and is dispatched to the backend; past the bound
    /// the position keeps counting silently. Playing while already playing
    /// is a no-op.
    pub fn play(&mut self) -> Result<()> {
        let state = self.state();
        let session = match (&self.session, state) {
            (Some(session), SessionState::Armed | SessionState::Paused) => session,
            (Some(_), SessionState::Playing) => return Ok(()),
            _ => return Err(PlaybackError::InvalidTransition { state, action: "play" }),
        };

        let position = Arc::clone(&session.position);
        let end = session.query.end.clone();
        let current_tx = self.current_tx.clone();
        let backend = Arc::clone(&self.backend);

        self.clock.start(move || {
            let tick = position.fetch_add(1, Ordering::SeqCst) + 1;
            let stamp = WireTimestamp::from_ticks(tick);
            if stamp <= end {
                current_tx.send_replace(Some(stamp.clone()));
                let backend = Arc::clone(&backend);
                tokio::spawn(async move {
                    if let Err(err) = backend.advance(&stamp).await {
                        debug!(error = %err, stamp = %stamp, "timeline advance dispatch failed");
                    }
                });
            }
        });

        self.advance_state(SessionState::Playing);
        Ok(())
    }

    /// Stop timeline advancement, holding the position.
    ///
    /// A tick already executing when the clock stops may still land before
    /// the position freezes. Pausing an armed or already-paused session is
    /// a no-op; pausing with no session is rejected.
    pub fn pause(&mut self) -> Result<()> {
        let state = self.state();
        match state {
            SessionState::Playing => {
                self.clock.stop();
                self.advance_state(SessionState::Paused);
                Ok(())
            }
            SessionState::Armed | SessionState::Paused => Ok(()),
            SessionState::Idle | SessionState::Querying => {
                Err(PlaybackError::InvalidTransition { state, action: "pause" })
            }
        }
    }

    /// Tear the session down and return the console to live telemetry.
    ///
    /// The clock stops first, so teardown initiates no further ticks; a
    /// tick already executing when the stop lands may still finish its
    /// display update and dispatch. The abort is dispatched to the backend,
    /// `playback:off` is published, the stream swaps back to the live
    /// source, and the session state is discarded.
    pub async fn abort(&mut self) -> Result<()> {
        let state = self.state();
        if !state.has_session() {
            return Err(PlaybackError::InvalidTransition { state, action: "abort" });
        }

        self.clock.stop();

        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            if let Err(err) = backend.abort_playback().await {
                debug!(error = %err, "playback abort dispatch failed");
            }
        });

        self.events.publish(PlaybackEvent::Off);
        self.swap_stream(StreamMode::Realtime).await;

        self.session = None;
        self.current_tx.send_replace(None);
        self.advance_state(SessionState::Idle);
        Ok(())
    }

    /// Replace the active telemetry stream with one for `mode`.
    ///
    /// The old stream is dropped before the new one opens so two sockets
    /// never coexist. A failed open leaves the console with no stream.
    async fn swap_stream(&mut self, mode: StreamMode) {
        self.stream = None;
        match self.gateway.open(mode).await {
            Ok(session) => self.stream = Some(session),
            Err(err) => warn!(error = %err, %mode, "stream swap failed"),
        }
    }

    fn advance_state(&self, next: SessionState) {
        let current = *self.state_tx.borrow();
        debug_assert!(current.can_advance_to(next), "illegal transition {current} -> {next}");
        debug!(from = %current, to = %next, "session state change");
        self.state_tx.send_replace(next);
    }
}
