//! Configuration for the playback console.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PlaybackError, Result};

/// One playback tick covers 100 milliseconds of telemetry time.
pub const TICK_UNIT: Duration = Duration::from_millis(100);

/// How often the playback clock checks the wall clock between ticks.
///
/// Polling at half the tick unit keeps tick emission within 50ms of the
/// ideal boundary without busy-waiting.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Settings for a playback console instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Base URL of the playback backend, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Timeout applied to every backend HTTP request and to the websocket
    /// handshake when a telemetry stream opens.
    pub request_timeout: Duration,
    /// Telemetry time represented by one playback tick.
    pub tick_unit: Duration,
    /// Wall-clock polling cadence of the playback clock.
    pub poll_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout: Duration::from_secs(10),
            tick_unit: TICK_UNIT,
            poll_interval: POLL_INTERVAL,
        }
    }
}

impl PlaybackConfig {
    /// Create a configuration pointing at the given backend.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    /// The base URL with any trailing slashes stripped.
    ///
    /// Endpoint paths all start with `/`, so the trimmed form can be joined
    /// with a plain `format!`.
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Parse the configured base URL, rejecting unusable values up front.
    pub fn parsed_base_url(&self) -> Result<Url> {
        Url::parse(self.trimmed_base_url()).map_err(|source| PlaybackError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })
    }
}
