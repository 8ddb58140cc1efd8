//! Wall-clock-synchronized playback clock.
//!
//! The clock turns elapsed wall time into discrete playback ticks. Every poll
//! it recomputes how many whole tick units have elapsed since the run was
//! anchored and emits at most one tick when that count grows. Recomputing
//! from the anchor instead of accumulating means a stalled poll never causes
//! a burst of catch-up emissions and timing error never compounds: the next
//! healthy poll lands back on the wall clock.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{POLL_INTERVAL, TICK_UNIT};

/// Emits playback ticks in step with the wall clock.
///
/// `start` is idempotent while a run is active; `stop` ends the run and a
/// later `start` anchors a fresh one. The tick counter latch resets with
/// each run, which is what makes pause simply a stop: position is the
/// caller's state, not the clock's.
pub struct PlaybackClock {
    tick_unit: Duration,
    poll_interval: Duration,
    cancel: Option<CancellationToken>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock {
    /// Create a clock with the standard 100ms tick unit and 50ms poll.
    pub fn new() -> Self {
        Self::with_timing(TICK_UNIT, POLL_INTERVAL)
    }

    /// Create a clock with custom timing.
    pub fn with_timing(tick_unit: Duration, poll_interval: Duration) -> Self {
        Self {
            tick_unit: tick_unit.max(Duration::from_millis(1)),
            poll_interval: poll_interval.max(Duration::from_millis(1)),
            cancel: None,
        }
    }

    /// Whether a run is active.
    pub fn is_running(&self) -> bool {
        self.cancel.is_some()
    }

    /// Start a run, invoking `on_tick` once per elapsed tick unit.
    ///
    /// Calling `start` while a run is active does nothing. The callback runs
    /// on a spawned task; at most one invocation happens per poll, so a
    /// stalled runtime skips ticks rather than bursting them.
    pub fn start<F>(&mut self, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        if self.cancel.is_some() {
            debug!("playback clock already running");
            return;
        }

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let tick_unit_millis = self.tick_unit.as_millis();
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            let anchor = Instant::now();
            let mut emitted: u128 = 0;
            let mut poll = interval(poll_interval);
            poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

            debug!("playback clock started");
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => {
                        debug!("playback clock stopped");
                        break;
                    }
                    _ = poll.tick() => {
                        let delta = anchor.elapsed().as_millis() / tick_unit_millis;
                        if delta > emitted {
                            emitted = delta;
                            on_tick();
                        }
                    }
                }
            }
        });

        self.cancel = Some(cancel);
    }

    /// End the active run, if any.
    ///
    /// A callback already executing completes; no further invocations
    /// begin.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }
}

impl Drop for PlaybackClock {
    fn drop(&mut self) {
        self.stop();
    }
}
