//! Backend trait for playback control

use crate::Result;
use crate::types::{PlaybackQuery, TimeRangeEntry, WireTimestamp};

/// Trait for playback control backends
///
/// Backends abstract over the transport used to reach the playback service
/// (HTTP in production, in-memory doubles in tests). Methods map one-to-one
/// onto the control operations; the session controller decides which calls
/// are awaited and which are dispatched fire-and-forget.
#[async_trait::async_trait]
pub trait PlaybackBackend: Send + Sync + 'static {
    /// Fetch the stored time range for every packet.
    ///
    /// Returns one entry per packet with data on disk. An empty list is
    /// normal on a fresh installation.
    async fn fetch_ranges(&self) -> Result<Vec<TimeRangeEntry>>;

    /// Ask the backend to stage historical packets for a query window.
    ///
    /// The backend prepares delivery of `query.packet` between the
    /// wire-normalized `query.start` and `query.end` bounds.
    async fn begin_playback(&self, query: &PlaybackQuery) -> Result<()>;

    /// Send one timeline instant for evaluation.
    ///
    /// The backend emits any staged packets stamped at or before `stamp`
    /// that it has not yet delivered.
    async fn advance(&self, stamp: &WireTimestamp) -> Result<()>;

    /// Tear down the active playback session on the backend.
    async fn abort_playback(&self) -> Result<()>;
}
