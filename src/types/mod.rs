//! Core types for playback session control.
//!
//! This module provides the foundational data structures for driving a
//! historical-telemetry playback session: wire timestamps, query inputs and
//! their validated form, available time ranges, and the session lifecycle
//! state machine.
//!
//! ## Architecture
//!
//! - [`WireTimestamp`] is the canonical decisecond instant the backend speaks
//! - [`QueryInput`] holds raw operator input; [`PlaybackQuery`] is its
//!   validated, wire-normalized form
//! - [`TimeRangeEntry`] describes one packet's stored replay window
//! - [`SessionState`] encodes the lifecycle state machine with a fixed
//!   transition edge set
//!
//! ## Usage Example
//!
//! ```rust
//! use flyback::types::{SessionState, WireTimestamp};
//!
//! // Wire timestamps order chronologically as plain strings
//! let early = WireTimestamp::from_ticks(9);
//! let late = WireTimestamp::from_ticks(10);
//! assert_eq!(early.as_str(), "1970-01-01T00:00:00.9Z");
//! assert_eq!(late.as_str(), "1970-01-01T00:00:01.0Z");
//! assert!(early < late);
//!
//! // The state machine only permits its fixed edge set
//! assert!(SessionState::Idle.can_advance_to(SessionState::Querying));
//! assert!(!SessionState::Idle.can_advance_to(SessionState::Playing));
//! ```

mod query;
mod range;
mod state;
mod timestamp;

// Re-export all public types
pub use query::{PlaybackQuery, QueryInput};
pub use range::TimeRangeEntry;
pub use state::SessionState;
pub use timestamp::{TICK_UNIT_MILLIS, WireTimestamp};
