//! Available-range catalog.
//!
//! The catalog caches the per-packet time ranges reported by the backend so
//! the console always has something to show. Refreshes are opportunistic: a
//! failed fetch keeps the previous entries, since stale ranges beat an empty
//! display while the backend restarts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use crate::backend::PlaybackBackend;
use crate::types::TimeRangeEntry;

/// Cache of the time ranges available for playback.
///
/// Entries are replaced wholesale on a successful refresh and left untouched
/// on a failed one. The same packet may appear in several entries when its
/// stored data has gaps; the catalog preserves whatever the backend reports.
pub struct RangeCatalog<B> {
    backend: Arc<B>,
    entries_tx: watch::Sender<Vec<TimeRangeEntry>>,
    refreshed_tx: watch::Sender<Option<DateTime<Utc>>>,
}

impl<B: PlaybackBackend> RangeCatalog<B> {
    /// Create an empty catalog over the given backend.
    pub fn new(backend: Arc<B>) -> Self {
        let (entries_tx, _) = watch::channel(Vec::new());
        let (refreshed_tx, _) = watch::channel(None);
        Self { backend, entries_tx, refreshed_tx }
    }

    /// Current catalog contents.
    pub fn entries(&self) -> Vec<TimeRangeEntry> {
        self.entries_tx.borrow().clone()
    }

    /// Packet names in catalog order, duplicates preserved.
    pub fn packet_names(&self) -> Vec<String> {
        self.entries_tx.borrow().iter().map(|entry| entry.packet.clone()).collect()
    }

    /// When the catalog last refreshed successfully.
    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        *self.refreshed_tx.borrow()
    }

    /// Watch for catalog replacements.
    pub fn subscribe(&self) -> watch::Receiver<Vec<TimeRangeEntry>> {
        self.entries_tx.subscribe()
    }

    /// Catalog contents as a stream, starting with the current entries.
    pub fn updates(&self) -> impl Stream<Item = Vec<TimeRangeEntry>> + 'static {
        WatchStream::new(self.entries_tx.subscribe())
    }

    /// Fetch the latest ranges from the backend.
    ///
    /// Failures are logged and swallowed; the catalog keeps serving its
    /// previous entries.
    pub async fn refresh(&self) {
        match self.backend.fetch_ranges().await {
            Ok(entries) => {
                debug!(count = entries.len(), "range catalog refreshed");
                self.entries_tx.send_replace(entries);
                self.refreshed_tx.send_replace(Some(Utc::now()));
            }
            Err(err) => {
                warn!(error = %err, "range refresh failed; keeping previous entries");
            }
        }
    }
}
