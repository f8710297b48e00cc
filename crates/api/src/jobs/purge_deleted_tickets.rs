//! Retention job for the ticket trash.

use chrono::{DateTime, Duration, Utc};
use persistence::{StoreError, TicketStore};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_tickets_purged;

#[derive(Debug, Error)]
pub enum PurgeError {
    #[error("retention window of {0} days is out of range")]
    WindowOutOfRange(u32),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Hard-deletes tickets that have been in the trash longer than the
/// retention window.
pub struct PurgeDeletedTicketsJob {
    store: Arc<dyn TicketStore>,
    retention_days: u32,
    interval_minutes: u64,
}

impl PurgeDeletedTicketsJob {
    pub fn new(store: Arc<dyn TicketStore>, retention_days: u32, interval_minutes: u64) -> Self {
        Self {
            store,
            retention_days,
            interval_minutes,
        }
    }

    /// Trashed tickets deleted before this instant are purged.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, PurgeError> {
        Duration::try_days(i64::from(self.retention_days))
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or(PurgeError::WindowOutOfRange(self.retention_days))
    }

    /// Runs one purge pass and returns the number of tickets removed.
    pub async fn purge(&self) -> Result<u64, PurgeError> {
        let cutoff = self.cutoff(Utc::now())?;
        let purged = self.store.purge_deleted(cutoff).await?;
        if purged > 0 {
            record_tickets_purged(purged);
            info!(
                purged,
                retention_days = self.retention_days,
                cutoff = %cutoff,
                "Purged tickets from trash"
            );
        }
        Ok(purged)
    }
}

#[async_trait::async_trait]
impl Job for PurgeDeletedTicketsJob {
    fn name(&self) -> &'static str {
        "purge_deleted_tickets"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        self.purge().await.map(|_| ()).map_err(|e| e.to_string())
    }
}
