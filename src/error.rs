//! Error types for playback session control.
//!
//! All fallible operations in this crate return [`PlaybackError`] through the
//! crate-wide [`Result`] alias, with structured context on every variant.
//!
//! ## Error Categories
//!
//! - **Validation Errors**: Query fields rejected before anything is sent
//! - **Transition Errors**: Session commands the current state does not permit
//! - **Transport Errors**: HTTP request or response failures from the backend
//! - **Gateway Errors**: Telemetry stream handshake or dictionary failures
//! - **Timestamp Errors**: Wire timestamps that cannot be interpreted
//!
//! ## Surfaced vs. Logged
//!
//! The session controller propagates validation and transition errors to the
//! caller synchronously, while transport and gateway failures from detached
//! request tasks are logged and discarded. Errors report which side of that
//! boundary they fall on:
//!
//! ```rust
//! use flyback::PlaybackError;
//!
//! let error = PlaybackError::transport("POST /playback/send returned 502");
//! if !error.is_surfaced() {
//!     // worth a log line, never worth failing the session over
//!     println!("background request failed: {error}");
//! }
//! ```

use thiserror::Error;

use crate::types::SessionState;
use crate::validate::ValidationReport;

/// Result type alias for playback operations.
pub type Result<T, E = PlaybackError> = std::result::Result<T, E>;

/// Main error type for playback session control.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PlaybackError {
    /// One or more query fields failed validation.
    #[error("query validation failed: {report}")]
    Validation {
        /// Per-field outcome of the rejected submission.
        report: ValidationReport,
    },

    /// The session state machine does not permit the requested command.
    #[error("cannot {action} while session is {state}")]
    InvalidTransition {
        /// State the session was in when the command arrived.
        state: SessionState,
        /// The rejected command, e.g. `"play"` or `"submit"`.
        action: &'static str,
    },

    /// An HTTP request to the playback backend failed.
    #[error("backend request failed: {context}")]
    Transport {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Opening or switching the telemetry stream failed.
    #[error("stream gateway error: {context}")]
    Gateway {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A wire timestamp could not be interpreted.
    #[error("invalid timestamp '{value}': {details}")]
    Timestamp { value: String, details: String },

    /// The configured base URL could not be parsed.
    #[error("invalid base URL '{url}'")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl PlaybackError {
    /// Returns whether this error is surfaced to the caller.
    ///
    /// Validation, transition, timestamp, and configuration errors reach the
    /// caller synchronously. Transport and gateway failures are swallowed at
    /// the fire-and-forget boundary of the session controller and only ever
    /// appear in logs.
    pub fn is_surfaced(&self) -> bool {
        match self {
            PlaybackError::Validation { .. }
            | PlaybackError::InvalidTransition { .. }
            | PlaybackError::Timestamp { .. }
            | PlaybackError::BaseUrl { .. } => true,
            PlaybackError::Transport { .. } | PlaybackError::Gateway { .. } => false,
        }
    }

    /// Create a transport error without an underlying source.
    pub fn transport(context: impl Into<String>) -> Self {
        PlaybackError::Transport { context: context.into(), source: None }
    }

    /// Create a transport error wrapping an underlying source.
    pub fn transport_with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PlaybackError::Transport { context: context.into(), source: Some(Box::new(source)) }
    }

    /// Create a gateway error without an underlying source.
    pub fn gateway(context: impl Into<String>) -> Self {
        PlaybackError::Gateway { context: context.into(), source: None }
    }

    /// Create a gateway error wrapping an underlying source.
    pub fn gateway_with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PlaybackError::Gateway { context: context.into(), source: Some(Box::new(source)) }
    }

    /// Create a timestamp error.
    pub fn timestamp(value: impl Into<String>, details: impl Into<String>) -> Self {
        PlaybackError::Timestamp { value: value.into(), details: details.into() }
    }
}

impl From<reqwest::Error> for PlaybackError {
    fn from(err: reqwest::Error) -> Self {
        let context = match err.url() {
            Some(url) => format!("{err} ({url})"),
            None => err.to_string(),
        };
        PlaybackError::Transport { context, source: Some(Box::new(err)) }
    }
}
