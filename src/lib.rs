//! Session-scoped playback control for telemetry ground consoles.
//!
//! Flyback drives historical telemetry replay against an HTTP backend: it
//! validates operator queries, arms playback sessions, advances a decisecond
//! timeline on a wall-clock cadence, and swaps the console's telemetry
//! stream between live and historical sources.
//!
//! # Features
//!
//! - **Session lifecycle**: idle, querying, armed, playing, paused, with
//!   every transition checked
//! - **Wire-format timestamps**: fixed-width decisecond stamps whose string
//!   order is their chronological order
//! - **Fault isolation**: backend and stream failures are logged, never
//!   surfaced to the operator
//! - **Observable state**: watch channels and broadcast events for every
//!   state change
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use flyback::{PlaybackConfig, PlaybackConsole, QueryInput};
//!
//! #[tokio::main]
//! async fn main() -> flyback::Result<()> {
//!     let mut console = PlaybackConsole::new(PlaybackConfig::new("http://localhost:8080"))?;
//!     console.refresh_ranges().await;
//!
//!     let query = QueryInput::new(
//!         "1553_HS_Packet",
//!         "2024-03-01T12:00:00Z",
//!         "2024-03-01T12:05:00Z",
//!     );
//!     console.submit(&query).await?;
//!     console.play()?;
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod config;
mod error;
mod events;
#[cfg(test)]
pub mod test_utils;
pub mod types;
mod validate;

// Session architecture
mod catalog;
mod clock;
mod controller;

// Backend and stream seams
pub mod backend;
pub mod backends;
pub mod streaming;

// Core exports
pub use config::{POLL_INTERVAL, PlaybackConfig, TICK_UNIT};
pub use error::{PlaybackError, Result};
pub use events::{EventBus, EventReceiver, PlaybackEvent};
pub use types::{
    PlaybackQuery, QueryInput, SessionState, TICK_UNIT_MILLIS, TimeRangeEntry, WireTimestamp,
};
pub use validate::{QueryField, ValidationReport, checked_query, validate};

// Session exports
pub use catalog::RangeCatalog;
pub use clock::PlaybackClock;
pub use controller::{PlaybackController, PlaybackSession, Timeline};

// Backend and stream exports
pub use backend::PlaybackBackend;
pub use backends::HttpBackend;
pub use streaming::{HttpStreamGateway, StreamGateway, StreamMode, StreamingSession, socket_url};

use std::sync::Arc;

/// Unified entry point wiring a playback controller to an HTTP backend.
///
/// The console owns a [`PlaybackController`] talking to an [`HttpBackend`]
/// and an [`HttpStreamGateway`], plus a [`RangeCatalog`] of queryable time
/// ranges, all built from one [`PlaybackConfig`].
///
/// # Example
///
/// ```rust,no_run
/// use flyback::{PlaybackConfig, PlaybackConsole};
///
/// #[tokio::main]
/// async fn main() -> flyback::Result<()> {
///     let console = PlaybackConsole::new(PlaybackConfig::default())?;
///     println!("session is {}", console.state());
///     Ok(())
/// }
/// ```
pub struct PlaybackConsole {
    controller: PlaybackController<HttpBackend, HttpStreamGateway>,
    catalog: RangeCatalog<HttpBackend>,
}

impl PlaybackConsole {
    /// Build a console for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured base URL does not parse or the
    /// HTTP client cannot be constructed.
    pub fn new(config: PlaybackConfig) -> Result<Self> {
        let backend = Arc::new(HttpBackend::from_config(&config)?);
        let gateway = Arc::new(HttpStreamGateway::from_config(&config)?);
        let clock = PlaybackClock::with_timing(config.tick_unit, config.poll_interval);
        let controller =
            PlaybackController::new(Arc::clone(&backend), gateway, EventBus::new(), clock);
        let catalog = RangeCatalog::new(backend);
        Ok(Self { controller, catalog })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.controller.state()
    }

    /// Re-fetch the catalog of queryable time ranges.
    pub async fn refresh_ranges(&self) {
        self.catalog.refresh().await;
    }

    /// The most recently fetched time ranges.
    pub fn ranges(&self) -> Vec<TimeRangeEntry> {
        self.catalog.entries()
    }

    /// Validate a query and arm a playback session for it.
    ///
    /// See [`PlaybackController::submit`].
    pub async fn submit(&mut self, input: &QueryInput) -> Result<()> {
        self.controller.submit(input).await
    }

    /// Start or resume timeline advancement.
    pub fn play(&mut self) -> Result<()> {
        self.controller.play()
    }

    /// Stop timeline advancement, holding the position.
    pub fn pause(&mut self) -> Result<()> {
        self.controller.pause()
    }

    /// Tear the session down and return to live telemetry.
    pub async fn abort(&mut self) -> Result<()> {
        self.controller.abort().await
    }

    /// The underlying controller, for state and event observation.
    pub fn controller(&self) -> &PlaybackController<HttpBackend, HttpStreamGateway> {
        &self.controller
    }

    /// The underlying range catalog, for subscriptions.
    pub fn catalog(&self) -> &RangeCatalog<HttpBackend> {
        &self.catalog
    }
}
