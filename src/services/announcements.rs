use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::announcement::{Announcement, AnnouncementDraft};
use crate::services::changes::ChangeFeed;

/// Authoritative in-memory registry of announcements.
///
/// The record set is small and operator-authored, so it lives in process
/// memory; every mutation publishes a change event on the feed so connected
/// consoles re-fetch the full list.
pub struct AnnouncementService {
    records: RwLock<Vec<Announcement>>,
    changes: ChangeFeed,
}

impl AnnouncementService {
    pub fn new(changes: ChangeFeed) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            changes,
        }
    }

    /// Full snapshot of the current set. Ordering is not part of the
    /// contract; callers sort for presentation if they care.
    pub async fn list(&self) -> Vec<Announcement> {
        self.records.read().await.clone()
    }

    /// Validate and store a new announcement.
    ///
    /// The server re-runs draft validation regardless of what the client
    /// checked, and rejects any window overlapping an existing one. The
    /// overlap check and the insert happen under one write lock so two
    /// concurrent creates cannot both pass.
    pub async fn create(&self, draft: AnnouncementDraft) -> Result<Announcement, ApiError> {
        draft.validate()?;

        let mut records = self.records.write().await;
        if records
            .iter()
            .any(|existing| existing.overlaps(draft.start_date, draft.end_date))
        {
            return Err(ApiError::OverlappingWindow);
        }

        let announcement = Announcement {
            id: Uuid::new_v4(),
            message: draft.message.trim().to_string(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            severity: draft.severity,
            created_at: Utc::now(),
        };
        records.push(announcement.clone());
        drop(records);

        self.changes.publish();
        Ok(announcement)
    }

    /// Remove an announcement. Idempotent: deleting an unknown id succeeds
    /// and returns `false`; a change event is only published when a record
    /// was actually removed.
    pub async fn delete(&self, id: Uuid) -> bool {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|a| a.id != id);
        let removed = records.len() != before;
        drop(records);

        if removed {
            self.changes.publish();
        }
        removed
    }
}
