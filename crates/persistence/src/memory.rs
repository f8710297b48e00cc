//! In-process ticket store.
//!
//! Selected with `database.url = "memory://"` and used by the test suites.
//! Every mutation happens under the write lock, which makes the status
//! transition atomic in the same way the conditional `UPDATE` is in Postgres.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{NewTicket, StatusChange, Ticket, TicketStats, TicketStatus};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{StatusUpdate, StoreError, TicketStore};

/// HashMap-backed ticket store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTicketStore {
    tickets: Arc<RwLock<HashMap<Uuid, Ticket>>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, including soft-deleted ones.
    pub async fn len(&self) -> usize {
        self.tickets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tickets.read().await.is_empty()
    }

    /// Raw row lookup that ignores the soft-delete flag.
    pub async fn get_raw(&self, id: Uuid) -> Option<Ticket> {
        self.tickets.read().await.get(&id).cloned()
    }

    async fn list_where(&self, deleted: bool) -> Vec<Ticket> {
        let tickets = self.tickets.read().await;
        let mut rows: Vec<Ticket> = tickets
            .values()
            .filter(|t| t.deleted == deleted)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        rows
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn create(&self, new: NewTicket) -> Result<Ticket, StoreError> {
        let ticket = Ticket::issue(new, Utc::now());
        let mut tickets = self.tickets.write().await;
        if tickets.contains_key(&ticket.id) {
            return Err(StoreError::Conflict(format!(
                "ticket {} already exists",
                ticket.id
            )));
        }
        tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn list_active(&self) -> Result<Vec<Ticket>, StoreError> {
        Ok(self.list_where(false).await)
    }

    async fn list_deleted(&self) -> Result<Vec<Ticket>, StoreError> {
        Ok(self.list_where(true).await)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let tickets = self.tickets.read().await;
        Ok(tickets.get(&id).filter(|t| !t.deleted).cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        change: StatusChange,
    ) -> Result<StatusUpdate, StoreError> {
        let mut tickets = self.tickets.write().await;
        let Some(ticket) = tickets.get_mut(&id).filter(|t| !t.deleted) else {
            return Ok(StatusUpdate::NotFound);
        };

        if ticket.apply(&change, Utc::now()) {
            Ok(StatusUpdate::Applied(ticket.clone()))
        } else {
            Ok(StatusUpdate::Unchanged(ticket.clone()))
        }
    }

    async fn soft_delete(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let mut tickets = self.tickets.write().await;
        Ok(tickets.get_mut(&id).filter(|t| !t.deleted).map(|ticket| {
            ticket.deleted = true;
            ticket.deleted_at = Some(Utc::now());
            ticket.clone()
        }))
    }

    async fn restore(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let mut tickets = self.tickets.write().await;
        Ok(tickets.get_mut(&id).filter(|t| t.deleted).map(|ticket| {
            ticket.deleted = false;
            ticket.deleted_at = None;
            ticket.clone()
        }))
    }

    async fn hard_delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tickets.write().await.remove(&id).is_some())
    }

    async fn stats(&self) -> Result<TicketStats, StoreError> {
        let tickets = self.tickets.read().await;
        let mut stats = TicketStats::default();
        for ticket in tickets.values() {
            if ticket.deleted {
                stats.deleted += 1;
                continue;
            }
            stats.total += 1;
            match ticket.status {
                TicketStatus::Valid => stats.valid += 1,
                TicketStatus::Used => stats.used += 1,
            }
        }
        Ok(stats)
    }

    async fn purge_deleted(&self, before: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut tickets = self.tickets.write().await;
        let start = tickets.len();
        tickets.retain(|_, t| !(t.deleted && t.deleted_at.is_some_and(|at| at < before)));
        Ok((start - tickets.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveTime};
    use domain::models::UsageReason;

    fn new_ticket(participant: &str) -> NewTicket {
        NewTicket {
            event_name: "Gala".to_string(),
            participant_name: participant.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            address: "Main Hall".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_valid_active_ticket() {
        let store = InMemoryTicketStore::new();
        let first = store.create(new_ticket("A. Dupont")).await.unwrap();
        let second = store.create(new_ticket("B. Martin")).await.unwrap();

        assert_eq!(first.status, TicketStatus::Valid);
        assert!(!first.deleted);
        assert_ne!(first.id, second.id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_list_active_newest_first() {
        let store = InMemoryTicketStore::new();
        let first = store.create(new_ticket("A")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = store.create(new_ticket("B")).await.unwrap();

        let listed = store.list_active().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_list_deleted_newest_first() {
        let store = InMemoryTicketStore::new();
        let first = store.create(new_ticket("A")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = store.create(new_ticket("B")).await.unwrap();

        // Trash order does not matter; creation order does.
        store.soft_delete(second.id).await.unwrap();
        store.soft_delete(first.id).await.unwrap();

        let trash = store.list_deleted().await.unwrap();
        assert_eq!(trash.len(), 2);
        assert_eq!(trash[0].id, second.id);
        assert_eq!(trash[1].id, first.id);
    }

    #[tokio::test]
    async fn test_update_status_applies_once() {
        let store = InMemoryTicketStore::new();
        let ticket = store.create(new_ticket("A. Dupont")).await.unwrap();

        let first = store
            .update_status(ticket.id, StatusChange::redeem("door-1"))
            .await
            .unwrap();
        let StatusUpdate::Applied(applied) = first else {
            panic!("expected Applied, got {:?}", first);
        };
        assert_eq!(applied.status, TicketStatus::Used);
        assert_eq!(applied.used_by.as_deref(), Some("door-1"));

        let second = store
            .update_status(ticket.id, StatusChange::revoke("admin"))
            .await
            .unwrap();
        let StatusUpdate::Unchanged(unchanged) = second else {
            panic!("expected Unchanged, got {:?}", second);
        };
        assert_eq!(unchanged.used_reason, Some(UsageReason::Redeemed));
    }

    #[tokio::test]
    async fn test_update_status_unknown_and_deleted() {
        let store = InMemoryTicketStore::new();
        assert_eq!(
            store
                .update_status(Uuid::new_v4(), StatusChange::redeem("door"))
                .await
                .unwrap(),
            StatusUpdate::NotFound
        );

        let ticket = store.create(new_ticket("A")).await.unwrap();
        store.soft_delete(ticket.id).await.unwrap();
        assert_eq!(
            store
                .update_status(ticket.id, StatusChange::redeem("door"))
                .await
                .unwrap(),
            StatusUpdate::NotFound
        );
        let raw = store.get_raw(ticket.id).await.unwrap();
        assert_eq!(raw.status, TicketStatus::Valid);
    }

    #[tokio::test]
    async fn test_soft_delete_restore_hard_delete() {
        let store = InMemoryTicketStore::new();
        let ticket = store.create(new_ticket("A")).await.unwrap();

        let deleted = store.soft_delete(ticket.id).await.unwrap().unwrap();
        assert!(deleted.deleted);
        assert!(deleted.deleted_at.is_some());
        assert!(store.get_by_id(ticket.id).await.unwrap().is_none());
        assert!(store.list_active().await.unwrap().is_empty());
        assert_eq!(store.list_deleted().await.unwrap().len(), 1);
        assert!(store.soft_delete(ticket.id).await.unwrap().is_none());

        let restored = store.restore(ticket.id).await.unwrap().unwrap();
        assert!(!restored.deleted);
        assert!(restored.deleted_at.is_none());
        assert!(store.restore(ticket.id).await.unwrap().is_none());
        assert!(store.get_by_id(ticket.id).await.unwrap().is_some());

        assert!(store.hard_delete(ticket.id).await.unwrap());
        assert!(!store.hard_delete(ticket.id).await.unwrap());
        assert!(store.get_raw(ticket.id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_stats() {
        let store = InMemoryTicketStore::new();
        let a = store.create(new_ticket("A")).await.unwrap();
        store.create(new_ticket("B")).await.unwrap();
        let c = store.create(new_ticket("C")).await.unwrap();
        store
            .update_status(a.id, StatusChange::redeem("door"))
            .await
            .unwrap();
        store.soft_delete(c.id).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(
            stats,
            TicketStats {
                total: 2,
                valid: 1,
                used: 1,
                deleted: 1
            }
        );
    }

    #[tokio::test]
    async fn test_purge_deleted_respects_cutoff() {
        let store = InMemoryTicketStore::new();
        let kept = store.create(new_ticket("A")).await.unwrap();
        let purged = store.create(new_ticket("B")).await.unwrap();
        store.soft_delete(purged.id).await.unwrap();

        let past = Utc::now() - Duration::days(1);
        assert_eq!(store.purge_deleted(past).await.unwrap(), 0);

        let future = Utc::now() + Duration::seconds(1);
        assert_eq!(store.purge_deleted(future).await.unwrap(), 1);
        assert!(store.get_raw(purged.id).await.is_none());
        assert!(store.get_raw(kept.id).await.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_redemption_single_winner() {
        let store = Arc::new(InMemoryTicketStore::new());
        let ticket = store.create(new_ticket("A")).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .update_status(ticket.id, StatusChange::redeem(format!("door-{}", i)))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut applied = 0;
        let mut unchanged = 0;
        for handle in handles {
            match handle.await.unwrap() {
                StatusUpdate::Applied(_) => applied += 1,
                StatusUpdate::Unchanged(_) => unchanged += 1,
                StatusUpdate::NotFound => panic!("ticket vanished"),
            }
        }
        assert_eq!(applied, 1);
        assert_eq!(unchanged, 15);
    }
}
