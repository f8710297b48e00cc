//! Ticket repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{NewTicket, StatusChange, Ticket, TicketStats};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{TicketEntity, TicketStatsEntity, TicketStatusDb, UsageReasonDb};
use crate::metrics::QueryTimer;
use crate::store::{StatusUpdate, StoreError, TicketStore};

const TICKET_COLUMNS: &str = "id, eventname, participantname, date, time, address, qrcode, \
     status, createdat, deleted, deletedat, usedat, usedreason, usedby";

/// PostgreSQL-backed ticket store.
#[derive(Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    /// Creates a new TicketRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn list_where_deleted(
        &self,
        deleted: bool,
        query_name: &'static str,
    ) -> Result<Vec<Ticket>, StoreError> {
        let timer = QueryTimer::new(query_name);
        let result = sqlx::query_as::<_, TicketEntity>(&format!(
            "SELECT {} FROM tickets WHERE deleted = $1 ORDER BY createdat DESC, id",
            TICKET_COLUMNS
        ))
        .bind(deleted)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.into_iter().map(Ticket::from).collect())
    }
}

#[async_trait]
impl TicketStore for TicketRepository {
    async fn create(&self, new: NewTicket) -> Result<Ticket, StoreError> {
        let id = Uuid::new_v4();
        let timer = QueryTimer::new("create_ticket");
        let result = sqlx::query_as::<_, TicketEntity>(&format!(
            r#"
            INSERT INTO tickets (id, eventname, participantname, date, time, address, qrcode, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            TICKET_COLUMNS
        ))
        .bind(id)
        .bind(&new.event_name)
        .bind(&new.participant_name)
        .bind(new.date)
        .bind(new.time)
        .bind(&new.address)
        .bind(id.to_string())
        .bind(TicketStatusDb::Valid)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.into())
    }

    async fn list_active(&self) -> Result<Vec<Ticket>, StoreError> {
        self.list_where_deleted(false, "list_active_tickets").await
    }

    async fn list_deleted(&self) -> Result<Vec<Ticket>, StoreError> {
        self.list_where_deleted(true, "list_deleted_tickets").await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let timer = QueryTimer::new("find_ticket_by_id");
        let result = sqlx::query_as::<_, TicketEntity>(&format!(
            "SELECT {} FROM tickets WHERE id = $1 AND deleted = false",
            TICKET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.map(Ticket::from))
    }

    async fn update_status(
        &self,
        id: Uuid,
        change: StatusChange,
    ) -> Result<StatusUpdate, StoreError> {
        // The WHERE clause is re-evaluated after the row lock, so only one
        // concurrent caller can match status = 'valid'.
        let timer = QueryTimer::new("update_ticket_status");
        let applied = sqlx::query_as::<_, TicketEntity>(&format!(
            r#"
            UPDATE tickets
            SET status = $2, usedat = NOW(), usedreason = $3, usedby = $4
            WHERE id = $1 AND deleted = false AND status = 'valid'
            RETURNING {}
            "#,
            TICKET_COLUMNS
        ))
        .bind(id)
        .bind(TicketStatusDb::from(change.target()))
        .bind(UsageReasonDb::from(change.reason))
        .bind(&change.actor)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&applied);

        if let Some(entity) = applied? {
            return Ok(StatusUpdate::Applied(entity.into()));
        }

        let current = self.get_by_id(id).await?;
        tracing::debug!(
            ticket_id = %id,
            found = current.is_some(),
            "Status transition not applied"
        );
        Ok(match current {
            Some(ticket) => StatusUpdate::Unchanged(ticket),
            None => StatusUpdate::NotFound,
        })
    }

    async fn soft_delete(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let timer = QueryTimer::new("soft_delete_ticket");
        let result = sqlx::query_as::<_, TicketEntity>(&format!(
            r#"
            UPDATE tickets
            SET deleted = true, deletedat = NOW()
            WHERE id = $1 AND deleted = false
            RETURNING {}
            "#,
            TICKET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.map(Ticket::from))
    }

    async fn restore(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let timer = QueryTimer::new("restore_ticket");
        let result = sqlx::query_as::<_, TicketEntity>(&format!(
            r#"
            UPDATE tickets
            SET deleted = false, deletedat = NULL
            WHERE id = $1 AND deleted = true
            RETURNING {}
            "#,
            TICKET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.map(Ticket::from))
    }

    async fn hard_delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("hard_delete_ticket");
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.finish(&result);
        Ok(result?.rows_affected() > 0)
    }

    async fn stats(&self) -> Result<TicketStats, StoreError> {
        let timer = QueryTimer::new("ticket_stats");
        let result = sqlx::query_as::<_, TicketStatsEntity>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE deleted = false) AS total,
                COUNT(*) FILTER (WHERE deleted = false AND status = 'valid') AS valid,
                COUNT(*) FILTER (WHERE deleted = false AND status = 'used') AS used,
                COUNT(*) FILTER (WHERE deleted = true) AS deleted
            FROM tickets
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.into())
    }

    async fn purge_deleted(&self, before: DateTime<Utc>) -> Result<u64, StoreError> {
        let timer = QueryTimer::new("purge_deleted_tickets");
        let result = sqlx::query("DELETE FROM tickets WHERE deleted = true AND deletedat < $1")
            .bind(before)
            .execute(&self.pool)
            .await;
        timer.finish(&result);
        Ok(result?.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let timer = QueryTimer::new("ping");
        let result = sqlx::query("SELECT 1").execute(&self.pool).await;
        timer.finish(&result);
        result?;
        Ok(())
    }
}
