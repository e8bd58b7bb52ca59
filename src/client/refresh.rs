use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, Mutex};
use tracing::warn;

use crate::models::announcement::Announcement;

use super::store::{AnnouncementStore, StoreError};

/// Owns the console's in-memory announcement list.
///
/// The list is a cache invalidated wholesale: every refresh replaces the
/// snapshot with the server's answer, never merges. Refreshes may overlap —
/// a create-triggered one racing a notifier-triggered one — and converge on
/// whichever response resolved last. After `close`, in-flight results are
/// dropped on arrival so a disposed view is never mutated.
pub struct AnnouncementFeed<S> {
    store: S,
    snapshot: Mutex<Vec<Announcement>>,
    closed: AtomicBool,
}

impl<S: AnnouncementStore> AnnouncementFeed<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            snapshot: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch and install a fresh snapshot.
    ///
    /// A failed fetch leaves the previous snapshot intact and hands the
    /// error back for exactly one user-visible notice.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let records = self.store.list().await?;
        let mut snapshot = self.snapshot.lock().await;
        if self.closed.load(Ordering::Acquire) {
            return Ok(());
        }
        *snapshot = records;
        Ok(())
    }

    pub async fn snapshot(&self) -> Vec<Announcement> {
        self.snapshot.lock().await.clone()
    }

    /// Mark the feed disposed. Idempotent; any refresh still in flight
    /// discards its result.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Drive refreshes from a notifier signal channel until the channel
    /// closes or the feed is disposed. Failures are logged and the loop
    /// keeps going; the next signal retries anyway.
    pub async fn run(&self, mut signals: mpsc::Receiver<()>) {
        while signals.recv().await.is_some() {
            if self.is_closed() {
                break;
            }
            if let Err(e) = self.refresh().await {
                warn!("Announcement refresh failed: {e}");
            }
        }
    }
}
