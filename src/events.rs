//! Session lifecycle event fan-out.
//!
//! Other console components (stream indicators, plot overlays) react to
//! playback going on and off air. The bus is a thin wrapper over a tokio
//! broadcast channel so any number of observers can subscribe without the
//! session controller knowing about them.

use tokio::sync::broadcast;
use tracing::trace;

/// Broadcast capacity for lifecycle events (a session toggles rarely).
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// A change in the playback session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// A playback session was created and historical data is about to flow.
    On,
    /// The playback session ended and the console is back on live data.
    Off,
}

impl PlaybackEvent {
    /// Topic string used on the console message bus.
    pub fn topic(&self) -> &'static str {
        match self {
            PlaybackEvent::On => "playback:on",
            PlaybackEvent::Off => "playback:off",
        }
    }
}

/// Receiver half handed to event observers.
pub type EventReceiver = broadcast::Receiver<PlaybackEvent>;

/// Publishes playback lifecycle events to any number of subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlaybackEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a bus with no subscribers yet.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to lifecycle events published after this call.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// Publishing with no subscribers is not an error; the event is simply
    /// dropped.
    pub fn publish(&self, event: PlaybackEvent) {
        if self.sender.send(event).is_err() {
            trace!(topic = event.topic(), "lifecycle event had no subscribers");
        }
    }
}
