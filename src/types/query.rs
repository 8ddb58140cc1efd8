//! Playback query types

use serde::{Deserialize, Serialize};

use super::WireTimestamp;
use crate::error::Result;

/// Raw operator input for a playback query, prior to validation.
///
/// `packet` is `None` when no packet has been selected. Time bounds are
/// carried verbatim as typed; the validator decides whether they are usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryInput {
    /// Selected packet name, if any.
    pub packet: Option<String>,
    /// Start of the requested window, expected as `YYYY-MM-DDTHH:MM:SSZ`.
    pub start_time: String,
    /// End of the requested window, expected as `YYYY-MM-DDTHH:MM:SSZ`.
    pub end_time: String,
}

impl QueryInput {
    /// Convenience constructor with a packet selected.
    pub fn new(
        packet: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            packet: Some(packet.into()),
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }
}

/// A validated playback query with wire-normalized time bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackQuery {
    /// Packet name the backend should replay.
    pub packet: String,
    /// First instant of the window, in wire form.
    pub start: WireTimestamp,
    /// Last instant of the window, in wire form.
    pub end: WireTimestamp,
}

impl PlaybackQuery {
    /// Tick index of the window start on the epoch timeline.
    pub fn start_ticks(&self) -> Result<u64> {
        self.start.ticks()
    }

    /// Tick index of the window end on the epoch timeline.
    pub fn end_ticks(&self) -> Result<u64> {
        self.end.ticks()
    }
}
