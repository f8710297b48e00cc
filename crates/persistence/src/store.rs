//! Storage abstraction for tickets.
//!
//! Routes and services depend on [`TicketStore`] only; the backend is either
//! PostgreSQL ([`crate::repositories::TicketRepository`]) or the in-process
//! [`crate::memory::InMemoryTicketStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{NewTicket, StatusChange, Ticket, TicketStats};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by ticket storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(err.to_string())
            }
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(db_err.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Outcome of a status transition attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    /// This call moved the ticket from `Valid` to `Used`.
    Applied(Ticket),
    /// The ticket exists but was already used; nothing changed.
    Unchanged(Ticket),
    /// No active ticket has this id.
    NotFound,
}

/// Ticket persistence operations.
///
/// Soft-deleted tickets are invisible to `get_by_id` and `update_status`.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Persists a new ticket with a fresh id, `Valid` status and `created_at = now`.
    async fn create(&self, new: NewTicket) -> Result<Ticket, StoreError>;

    /// Active tickets, newest first.
    async fn list_active(&self) -> Result<Vec<Ticket>, StoreError>;

    /// Soft-deleted tickets, newest first.
    async fn list_deleted(&self) -> Result<Vec<Ticket>, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Ticket>, StoreError>;

    /// Atomically applies `Valid -> Used`. Of any number of concurrent calls
    /// for the same ticket, at most one returns [`StatusUpdate::Applied`].
    async fn update_status(&self, id: Uuid, change: StatusChange)
        -> Result<StatusUpdate, StoreError>;

    /// Marks an active ticket deleted. `None` if no active ticket has this id.
    async fn soft_delete(&self, id: Uuid) -> Result<Option<Ticket>, StoreError>;

    /// Returns a ticket from the trash. `None` if no deleted ticket has this id.
    async fn restore(&self, id: Uuid) -> Result<Option<Ticket>, StoreError>;

    /// Removes the row. Returns false if it did not exist.
    async fn hard_delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn stats(&self) -> Result<TicketStats, StoreError>;

    /// Hard-deletes tickets soft-deleted before `before`. Returns the count.
    async fn purge_deleted(&self, before: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
