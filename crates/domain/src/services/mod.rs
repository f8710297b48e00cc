//! Domain services for Ticket Desk.
//!
//! Services contain business logic that operates on domain models.

pub mod scan_payload;

pub use scan_payload::{candidate_id, parse_ticket_id, MAX_PAYLOAD_LENGTH};
