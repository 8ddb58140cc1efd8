//! Session lifecycle states

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No session exists; live telemetry flows.
    Idle,
    /// A validated query is being dispatched to the backend.
    Querying,
    /// A session exists with the timeline at its initial position.
    Armed,
    /// The playback clock is advancing the timeline.
    Playing,
    /// The clock is stopped with the timeline position held.
    Paused,
}

impl SessionState {
    /// Whether the state machine permits a direct move to `next`.
    ///
    /// Transitions form a fixed edge set; anything else is rejected with an
    /// `InvalidTransition` error by the session controller. A session never
    /// reaches `Playing` without passing through `Armed`, and every active
    /// state can fall back to `Idle` through an abort.
    pub fn can_advance_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Querying)
                | (Querying, Armed)
                | (Armed, Playing)
                | (Playing, Paused)
                | (Paused, Playing)
                | (Armed, Idle)
                | (Playing, Idle)
                | (Paused, Idle)
        )
    }

    /// Whether a playback session currently exists.
    pub fn has_session(self) -> bool {
        matches!(self, SessionState::Armed | SessionState::Playing | SessionState::Paused)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Querying => "querying",
            SessionState::Armed => "armed",
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
        };
        f.write_str(name)
    }
}
