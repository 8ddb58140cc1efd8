//! Telemetry stream gateway.
//!
//! A playback session replaces the console's live telemetry stream with a
//! historical one, and an abort replaces it back. Both swaps follow the same
//! recipe: fetch the telemetry dictionary over HTTP, then open a websocket to
//! the endpoint for the chosen mode. The gateway trait is the seam that lets
//! the session controller run against an in-memory stream in tests.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use url::Url;

use crate::Result;
use crate::config::PlaybackConfig;
use crate::error::PlaybackError;

/// Which telemetry source a stream carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Historical packets replayed by the playback session.
    Playback,
    /// Live packets as they arrive.
    Realtime,
}

impl StreamMode {
    /// Websocket endpoint path for this mode.
    pub fn socket_path(self) -> &'static str {
        match self {
            StreamMode::Playback => "/playback/playback",
            StreamMode::Realtime => "/tlm/realtime",
        }
    }
}

impl std::fmt::Display for StreamMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamMode::Playback => f.write_str("playback"),
            StreamMode::Realtime => f.write_str("realtime"),
        }
    }
}

/// Derive the websocket URL for a stream mode from an HTTP base URL.
///
/// `http` maps to `ws` and `https` to `wss`; host and port carry over
/// unchanged.
pub fn socket_url(base_url: &str, mode: StreamMode) -> Result<String> {
    let base = Url::parse(base_url).map_err(|source| PlaybackError::BaseUrl {
        url: base_url.to_string(),
        source,
    })?;

    let scheme = match base.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => {
            return Err(PlaybackError::gateway(format!("unsupported base URL scheme '{other}'")));
        }
    };
    let host = base
        .host_str()
        .ok_or_else(|| PlaybackError::gateway(format!("base URL '{base_url}' has no host")))?;

    Ok(match base.port() {
        Some(port) => format!("{scheme}://{host}:{port}{}", mode.socket_path()),
        None => format!("{scheme}://{host}{}", mode.socket_path()),
    })
}

/// Trait for opening telemetry streams
///
/// The production implementation dials real websockets; tests substitute a
/// recording double through the associated `Session` type.
#[async_trait::async_trait]
pub trait StreamGateway: Send + Sync + 'static {
    /// Stream handle type produced by this gateway.
    type Session: Send + 'static;

    /// Fetch the telemetry dictionary and open a stream for `mode`.
    async fn open(&self, mode: StreamMode) -> Result<Self::Session>;
}

/// An open telemetry stream with its dictionary.
#[derive(Debug)]
pub struct StreamingSession {
    mode: StreamMode,
    socket_url: String,
    dictionary: serde_json::Value,
    opened_at: DateTime<Utc>,
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl StreamingSession {
    /// Which telemetry source this stream carries.
    pub fn mode(&self) -> StreamMode {
        self.mode
    }

    /// The websocket URL this stream is connected to.
    pub fn socket_url(&self) -> &str {
        &self.socket_url
    }

    /// The telemetry dictionary fetched when the stream was opened.
    pub fn dictionary(&self) -> &serde_json::Value {
        &self.dictionary
    }

    /// When the stream was opened.
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Consume the session, yielding the underlying websocket.
    pub fn into_socket(self) -> WebSocketStream<MaybeTlsStream<TcpStream>> {
        self.socket
    }
}

/// Stream gateway that fetches the dictionary over HTTP and dials websockets.
///
/// Both the dictionary fetch and the websocket handshake are bounded by the
/// configured request timeout, so a backend that accepts connections but
/// never answers cannot stall the session controller.
#[derive(Debug, Clone)]
pub struct HttpStreamGateway {
    client: Client,
    base_url: String,
    connect_timeout: Duration,
}

impl HttpStreamGateway {
    /// Build a gateway from configuration.
    pub fn from_config(config: &PlaybackConfig) -> Result<Self> {
        config.parsed_base_url()?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.trimmed_base_url().to_string(),
            connect_timeout: config.request_timeout,
        })
    }
}

#[async_trait::async_trait]
impl StreamGateway for HttpStreamGateway {
    type Session = StreamingSession;

    async fn open(&self, mode: StreamMode) -> Result<StreamingSession> {
        // Dictionary first; a stream is useless without it
        let dict_url = format!("{}/tlm/dict", self.base_url);
        let dictionary: serde_json::Value =
            self.client.get(&dict_url).send().await?.error_for_status()?.json().await?;

        let socket_url = socket_url(&self.base_url, mode)?;
        let dial = timeout(self.connect_timeout, connect_async(socket_url.as_str())).await;
        let (socket, _) = match dial {
            Ok(Ok(connected)) => connected,
            Ok(Err(err)) => {
                return Err(PlaybackError::gateway_with_source(
                    format!("connecting {socket_url}"),
                    err,
                ));
            }
            Err(_) => {
                return Err(PlaybackError::gateway(format!(
                    "handshake with {socket_url} timed out after {:?}",
                    self.connect_timeout
                )));
            }
        };

        debug!(%mode, %socket_url, "telemetry stream open");
        Ok(StreamingSession { mode, socket_url, dictionary, opened_at: Utc::now(), socket })
    }
}
