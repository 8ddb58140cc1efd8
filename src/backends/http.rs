//! HTTP backend speaking the playback control endpoints

use reqwest::Client;
use reqwest::multipart::Form;
use tracing::debug;

use crate::Result;
use crate::backend::PlaybackBackend;
use crate::config::PlaybackConfig;
use crate::types::{PlaybackQuery, TimeRangeEntry, WireTimestamp};

/// Playback backend over HTTP.
///
/// Endpoint layout:
/// - `GET  /playback/range` returns stored time ranges per packet as JSON
/// - `POST /playback/query` stages packets for a window (multipart form)
/// - `POST /playback/send` evaluates one timeline instant (multipart form)
/// - `PUT  /playback/abort` tears the session down
///
/// Query and send bodies are multipart forms rather than JSON; the service
/// reads them as form submissions.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a backend from configuration.
    ///
    /// Fails fast on an unusable base URL or client setup so misconfiguration
    /// never surfaces as a mid-session transport error.
    pub fn from_config(config: &PlaybackConfig) -> Result<Self> {
        config.parsed_base_url()?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, base_url: config.trimmed_base_url().to_string() })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl PlaybackBackend for HttpBackend {
    async fn fetch_ranges(&self) -> Result<Vec<TimeRangeEntry>> {
        let url = self.endpoint("/playback/range");
        let ranges = self.client.get(&url).send().await?.error_for_status()?.json().await?;
        Ok(ranges)
    }

    async fn begin_playback(&self, query: &PlaybackQuery) -> Result<()> {
        let url = self.endpoint("/playback/query");
        let form = Form::new()
            .text("packet", query.packet.clone())
            .text("startTime", query.start.as_str().to_string())
            .text("endTime", query.end.as_str().to_string());

        debug!(packet = %query.packet, start = %query.start, end = %query.end, "dispatching playback query");
        self.client.post(&url).multipart(form).send().await?.error_for_status()?;
        Ok(())
    }

    async fn advance(&self, stamp: &WireTimestamp) -> Result<()> {
        let url = self.endpoint("/playback/send");
        let form = Form::new().text("timestamp", stamp.as_str().to_string());
        self.client.post(&url).multipart(form).send().await?.error_for_status()?;
        Ok(())
    }

    async fn abort_playback(&self) -> Result<()> {
        let url = self.endpoint("/playback/abort");
        self.client.put(&url).send().await?.error_for_status()?;
        Ok(())
    }
}
