//! Ticket entity (database row mapping).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domain::models::{Ticket, TicketStats, TicketStatus, UsageReason};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for ticket_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "lowercase")]
pub enum TicketStatusDb {
    Valid,
    Used,
}

impl From<TicketStatusDb> for TicketStatus {
    fn from(db_status: TicketStatusDb) -> Self {
        match db_status {
            TicketStatusDb::Valid => TicketStatus::Valid,
            TicketStatusDb::Used => TicketStatus::Used,
        }
    }
}

impl From<TicketStatus> for TicketStatusDb {
    fn from(status: TicketStatus) -> Self {
        match status {
            TicketStatus::Valid => TicketStatusDb::Valid,
            TicketStatus::Used => TicketStatusDb::Used,
        }
    }
}

/// Database enum for ticket_usage_reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "ticket_usage_reason", rename_all = "lowercase")]
pub enum UsageReasonDb {
    Redeemed,
    Revoked,
}

impl From<UsageReasonDb> for UsageReason {
    fn from(db_reason: UsageReasonDb) -> Self {
        match db_reason {
            UsageReasonDb::Redeemed => UsageReason::Redeemed,
            UsageReasonDb::Revoked => UsageReason::Revoked,
        }
    }
}

impl From<UsageReason> for UsageReasonDb {
    fn from(reason: UsageReason) -> Self {
        match reason {
            UsageReason::Redeemed => UsageReasonDb::Redeemed,
            UsageReason::Revoked => UsageReasonDb::Revoked,
        }
    }
}

/// Database row mapping for the tickets table.
#[derive(Debug, Clone, FromRow)]
pub struct TicketEntity {
    pub id: Uuid,
    #[sqlx(rename = "eventname")]
    pub event_name: String,
    #[sqlx(rename = "participantname")]
    pub participant_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub address: String,
    #[sqlx(rename = "qrcode")]
    pub qr_code: String,
    pub status: TicketStatusDb,
    #[sqlx(rename = "createdat")]
    pub created_at: DateTime<Utc>,
    pub deleted: bool,
    #[sqlx(rename = "deletedat")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[sqlx(rename = "usedat")]
    pub used_at: Option<DateTime<Utc>>,
    #[sqlx(rename = "usedreason")]
    pub used_reason: Option<UsageReasonDb>,
    #[sqlx(rename = "usedby")]
    pub used_by: Option<String>,
}

impl From<TicketEntity> for Ticket {
    fn from(entity: TicketEntity) -> Self {
        Self {
            id: entity.id,
            event_name: entity.event_name,
            participant_name: entity.participant_name,
            date: entity.date,
            time: entity.time,
            address: entity.address,
            status: entity.status.into(),
            created_at: entity.created_at,
            deleted: entity.deleted,
            deleted_at: entity.deleted_at,
            used_at: entity.used_at,
            used_reason: entity.used_reason.map(Into::into),
            used_by: entity.used_by,
        }
    }
}

/// Aggregate counters row.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct TicketStatsEntity {
    pub total: i64,
    pub valid: i64,
    pub used: i64,
    pub deleted: i64,
}

impl From<TicketStatsEntity> for TicketStats {
    fn from(entity: TicketStatsEntity) -> Self {
        Self {
            total: entity.total,
            valid: entity.valid,
            used: entity.used,
            deleted: entity.deleted,
        }
    }
}
