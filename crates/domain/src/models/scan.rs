//! Scan (redemption) request and outcome types.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ticket::Ticket;

/// Message shown when a scan is refused because the ticket was already used.
pub const ALREADY_USED_MESSAGE: &str = "Ticket already used";

/// Message shown when a scanned payload matches no active ticket.
pub const INVALID_TICKET_MESSAGE: &str = "Invalid ticket";

/// Payload decoded from a QR code by a scanner station.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ScanRequest {
    /// Either a bare ticket id or a share URL ending in the id. Anything
    /// else scans as `invalid` rather than failing validation.
    pub payload: String,
}

/// Result category of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanOutcome {
    Success,
    Used,
    Invalid,
}

impl ScanOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanOutcome::Success => "success",
            ScanOutcome::Used => "used",
            ScanOutcome::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response returned to the scanner station.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ScanResponse {
    pub outcome: ScanOutcome,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
}

impl ScanResponse {
    pub fn success(ticket: Ticket) -> Self {
        Self {
            outcome: ScanOutcome::Success,
            message: format!("Welcome {}!", ticket.participant_name),
            ticket: Some(ticket),
        }
    }

    pub fn used(ticket: Ticket) -> Self {
        Self {
            outcome: ScanOutcome::Used,
            message: ALREADY_USED_MESSAGE.to_string(),
            ticket: Some(ticket),
        }
    }

    pub fn invalid() -> Self {
        Self {
            outcome: ScanOutcome::Invalid,
            message: INVALID_TICKET_MESSAGE.to_string(),
            ticket: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ticket::NewTicket;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn ticket() -> Ticket {
        Ticket::issue(
            NewTicket {
                event_name: "Gala".to_string(),
                participant_name: "A. Dupont".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
                address: "Main Hall".to_string(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_success_greets_participant() {
        let response = ScanResponse::success(ticket());
        assert_eq!(response.outcome, ScanOutcome::Success);
        assert_eq!(response.message, "Welcome A. Dupont!");
        assert!(response.ticket.is_some());
    }

    #[test]
    fn test_used_and_invalid_messages() {
        let used = ScanResponse::used(ticket());
        assert_eq!(used.outcome, ScanOutcome::Used);
        assert_eq!(used.message, "Ticket already used");

        let invalid = ScanResponse::invalid();
        assert_eq!(invalid.outcome, ScanOutcome::Invalid);
        assert_eq!(invalid.message, "Invalid ticket");
        assert!(invalid.ticket.is_none());
    }

    #[test]
    fn test_invalid_response_omits_ticket() {
        let value = serde_json::to_value(ScanResponse::invalid()).unwrap();
        assert_eq!(value["outcome"], "invalid");
        assert!(value.get("ticket").is_none());
    }
}
