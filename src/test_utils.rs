//! Test doubles and async helpers shared by the in-crate test modules.

#![cfg(test)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::Instant;

use crate::Result;
use crate::backend::PlaybackBackend;
use crate::error::PlaybackError;
use crate::streaming::{StreamGateway, StreamMode};
use crate::types::{PlaybackQuery, TimeRangeEntry, WireTimestamp};

/// A backend call observed by [`ScriptedBackend`], in wire terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    FetchRanges,
    BeginPlayback { packet: String, start: String, end: String },
    Advance { stamp: String },
    AbortPlayback,
}

/// Backend double that records every call and replays scripted range results.
///
/// Range fetches consume queued results front to back; an empty queue yields
/// an empty catalog. The `fail_*` switches make the corresponding dispatch
/// return a transport error until cleared.
#[derive(Default)]
pub struct ScriptedBackend {
    calls: Mutex<Vec<BackendCall>>,
    range_results: Mutex<VecDeque<Result<Vec<TimeRangeEntry>>>>,
    fail_begin: AtomicBool,
    fail_advance: AtomicBool,
    fail_abort: AtomicBool,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next range fetch.
    pub fn push_ranges(&self, entries: Vec<TimeRangeEntry>) {
        self.range_results.lock().unwrap().push_back(Ok(entries));
    }

    /// Queue a failing range fetch.
    pub fn push_range_failure(&self, context: &str) {
        self.range_results.lock().unwrap().push_back(Err(PlaybackError::transport(context)));
    }

    pub fn fail_begin_playback(&self, fail: bool) {
        self.fail_begin.store(fail, Ordering::SeqCst);
    }

    pub fn fail_advance(&self, fail: bool) {
        self.fail_advance.store(fail, Ordering::SeqCst);
    }

    pub fn fail_abort(&self, fail: bool) {
        self.fail_abort.store(fail, Ordering::SeqCst);
    }

    /// Every call observed so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Stamps dispatched through [`PlaybackBackend::advance`], in order.
    pub fn advance_stamps(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                BackendCall::Advance { stamp } => Some(stamp.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl PlaybackBackend for ScriptedBackend {
    async fn fetch_ranges(&self) -> Result<Vec<TimeRangeEntry>> {
        self.record(BackendCall::FetchRanges);
        self.range_results.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn begin_playback(&self, query: &PlaybackQuery) -> Result<()> {
        self.record(BackendCall::BeginPlayback {
            packet: query.packet.clone(),
            start: query.start.as_str().to_string(),
            end: query.end.as_str().to_string(),
        });
        if self.fail_begin.load(Ordering::SeqCst) {
            return Err(PlaybackError::transport("scripted begin failure"));
        }
        Ok(())
    }

    async fn advance(&self, stamp: &WireTimestamp) -> Result<()> {
        self.record(BackendCall::Advance { stamp: stamp.as_str().to_string() });
        if self.fail_advance.load(Ordering::SeqCst) {
            return Err(PlaybackError::transport("scripted advance failure"));
        }
        Ok(())
    }

    async fn abort_playback(&self) -> Result<()> {
        self.record(BackendCall::AbortPlayback);
        if self.fail_abort.load(Ordering::SeqCst) {
            return Err(PlaybackError::transport("scripted abort failure"));
        }
        Ok(())
    }
}

/// Stream session double that remembers the mode it was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeStreamSession {
    pub mode: StreamMode,
}

/// Gateway double that records opens and can fail the next one on demand.
#[derive(Default)]
pub struct RecordingGateway {
    opens: Mutex<Vec<StreamMode>>,
    fail_next: AtomicBool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next open fail once.
    pub fn fail_next_open(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Modes opened so far, in order.
    pub fn opened(&self) -> Vec<StreamMode> {
        self.opens.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl StreamGateway for RecordingGateway {
    type Session = FakeStreamSession;

    async fn open(&self, mode: StreamMode) -> Result<FakeStreamSession> {
        self.opens.lock().unwrap().push(mode);
        // Yield so watchers get a poll between the states straddling a swap
        tokio::task::yield_now().await;
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(PlaybackError::gateway("scripted open failure"));
        }
        Ok(FakeStreamSession { mode })
    }
}

/// Poll `condition` every few milliseconds until it holds.
///
/// Panics with the timeout when the deadline passes so failing tests report
/// which wait stalled instead of hanging.
pub async fn wait_until(mut condition: impl FnMut() -> bool, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while !condition() {
        if Instant::now() >= deadline {
            panic!("condition not met within {timeout:?}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
