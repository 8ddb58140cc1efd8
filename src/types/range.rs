//! Available time ranges reported by the backend

use std::fmt;

use serde::Deserialize;

/// One packet's stored replay window, as reported by `GET /playback/range`.
///
/// The backend serializes each entry as a `[packet, start, end]` JSON triple.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, String, String)")]
pub struct TimeRangeEntry {
    /// Packet name.
    pub packet: String,
    /// Earliest stored timestamp for the packet.
    pub start_time: String,
    /// Latest stored timestamp for the packet.
    pub end_time: String,
}

impl From<(String, String, String)> for TimeRangeEntry {
    fn from((packet, start_time, end_time): (String, String, String)) -> Self {
        Self { packet, start_time, end_time }
    }
}

impl fmt::Display for TimeRangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} to {}", self.packet, self.start_time, self.end_time)
    }
}
