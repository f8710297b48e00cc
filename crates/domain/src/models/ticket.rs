//! Ticket domain model and issuance DTOs.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Maximum length for event and participant names.
pub const MAX_NAME_LENGTH: u64 = 200;

/// Maximum length for the venue address.
pub const MAX_ADDRESS_LENGTH: u64 = 500;

/// Lifecycle status of a ticket.
///
/// The only legal transition is `Valid -> Used`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Valid,
    Used,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Valid => "valid",
            TicketStatus::Used => "used",
        }
    }

    /// Whether a ticket in this status may move to `next`.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        matches!((self, next), (TicketStatus::Valid, TicketStatus::Used))
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a ticket moved to `Used`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageReason {
    /// Scanned at the door.
    Redeemed,
    /// Administrative override from the admin view.
    Revoked,
}

impl UsageReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageReason::Redeemed => "redeemed",
            UsageReason::Revoked => "revoked",
        }
    }
}

/// Request to move a ticket from `Valid` to `Used`.
///
/// Redemption and admin revoke share this single transition; the reason and
/// actor are recorded on the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub reason: UsageReason,
    pub actor: String,
}

impl StatusChange {
    pub fn redeem(actor: impl Into<String>) -> Self {
        Self {
            reason: UsageReason::Redeemed,
            actor: actor.into(),
        }
    }

    pub fn revoke(actor: impl Into<String>) -> Self {
        Self {
            reason: UsageReason::Revoked,
            actor: actor.into(),
        }
    }

    /// Target status of every change. Nothing moves a ticket back to `Valid`.
    pub fn target(&self) -> TicketStatus {
        TicketStatus::Used
    }
}

/// A single-use admission credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Ticket {
    pub id: Uuid,
    pub event_name: String,
    pub participant_name: String,
    pub date: NaiveDate,
    #[serde(with = "time_of_day")]
    pub time: NaiveTime,
    pub address: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub used_at: Option<DateTime<Utc>>,
    pub used_reason: Option<UsageReason>,
    pub used_by: Option<String>,
}

impl Ticket {
    /// Builds a fresh ticket: new id, `Valid`, not deleted.
    pub fn issue(new: NewTicket, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_name: new.event_name,
            participant_name: new.participant_name,
            date: new.date,
            time: new.time,
            address: new.address,
            status: TicketStatus::Valid,
            created_at: now,
            deleted: false,
            deleted_at: None,
            used_at: None,
            used_reason: None,
            used_by: None,
        }
    }

    /// The string encoded into the ticket's QR code.
    pub fn qr_payload(&self) -> String {
        self.id.to_string()
    }

    pub fn is_used(&self) -> bool {
        self.status == TicketStatus::Used
    }

    /// Applies a status change in place. Returns false if the ticket was not
    /// in a state that allows it.
    pub fn apply(&mut self, change: &StatusChange, now: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(change.target()) {
            return false;
        }
        self.status = change.target();
        self.used_at = Some(now);
        self.used_reason = Some(change.reason);
        self.used_by = Some(change.actor.clone());
        true
    }
}

/// Validated ticket fields ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub event_name: String,
    pub participant_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub address: String,
}

/// Issuance form submission.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateTicketRequest {
    #[validate(
        length(max = 200, message = "event_name must be at most 200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub event_name: String,

    #[validate(
        length(max = 200, message = "participant_name must be at most 200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub participant_name: String,

    #[validate(required(message = "date is required"))]
    pub date: Option<NaiveDate>,

    #[validate(required(message = "time is required"))]
    #[serde(default, with = "optional_time_of_day")]
    pub time: Option<NaiveTime>,

    #[validate(
        length(max = 500, message = "address must be at most 500 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub address: String,
}

impl CreateTicketRequest {
    /// Converts a validated request into persisted fields, trimming text.
    ///
    /// Returns `None` if a required value is missing; call `validate()` first
    /// to get a descriptive error.
    pub fn into_new_ticket(self) -> Option<NewTicket> {
        Some(NewTicket {
            event_name: self.event_name.trim().to_string(),
            participant_name: self.participant_name.trim().to_string(),
            date: self.date?,
            time: self.time?,
            address: self.address.trim().to_string(),
        })
    }
}

/// Response after issuing a ticket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct IssuedTicketResponse {
    pub ticket: Ticket,
    /// Text to encode in the QR code (the ticket id).
    pub qr_payload: String,
    /// Shareable link whose trailing path segment is the ticket id.
    pub share_url: String,
}

/// Ticket data shown on the public shareable page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PublicTicketView {
    pub id: Uuid,
    pub event_name: String,
    pub participant_name: String,
    pub date: NaiveDate,
    #[serde(with = "time_of_day")]
    pub time: NaiveTime,
    pub address: String,
    pub status: TicketStatus,
    pub qr_payload: String,
}

impl From<Ticket> for PublicTicketView {
    fn from(ticket: Ticket) -> Self {
        Self {
            qr_payload: ticket.qr_payload(),
            id: ticket.id,
            event_name: ticket.event_name,
            participant_name: ticket.participant_name,
            date: ticket.date,
            time: ticket.time,
            address: ticket.address,
            status: ticket.status,
        }
    }
}

/// Builds the shareable ticket URL `{base}/t/{id}`.
pub fn share_url(public_base_url: &str, id: Uuid) -> String {
    format!("{}/t/{}", public_base_url.trim_end_matches('/'), id)
}

/// Status filter for the admin active list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Valid,
    Used,
}

impl StatusFilter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Valid => ticket.status == TicketStatus::Valid,
            StatusFilter::Used => ticket.status == TicketStatus::Used,
        }
    }
}

/// Counters for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TicketStats {
    /// Active (not deleted) tickets.
    pub total: i64,
    pub valid: i64,
    pub used: i64,
    /// Tickets in the trash.
    pub deleted: i64,
}

/// Response for ticket listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListTicketsResponse {
    pub data: Vec<Ticket>,
    pub count: usize,
}

impl From<Vec<Ticket>> for ListTicketsResponse {
    fn from(data: Vec<Ticket>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// Parses a time of day written as `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Serde adapter writing times as `HH:MM` and reading `HH:MM[:SS]`.
pub mod time_of_day {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid time of day: {}", raw)))
    }
}

mod optional_time_of_day {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_time_of_day(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid time of day: {}", raw))),
        }
    }
}
