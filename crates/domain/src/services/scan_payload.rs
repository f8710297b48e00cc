//! Extracts the ticket id from a scanned QR payload.
//!
//! Scanner stations read either the bare id or a share link such as
//! `https://tickets.example.com/t/<id>`. Both forms resolve to the same id.

use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

lazy_static! {
    /// `scheme://` prefix of an absolute URL.
    static ref URL_SCHEME: Regex = Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://").unwrap();
}

/// Payloads longer than this cannot be a share link and are not parsed.
pub const MAX_PAYLOAD_LENGTH: usize = 2048;

/// Returns the candidate id string for a payload.
///
/// For URLs this is the last non-empty path segment (query and fragment are
/// ignored); otherwise it is the trimmed payload.
pub fn candidate_id(payload: &str) -> &str {
    let payload = payload.trim();

    let Some(scheme) = URL_SCHEME.find(payload) else {
        return payload;
    };

    let rest = &payload[scheme.end()..];
    let rest = rest.split(['?', '#']).next().unwrap_or_default();

    // The first segment is the authority.
    rest.split('/')
        .skip(1)
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or_default()
}

/// Parses a payload into a ticket id. `None` means no ticket can match.
pub fn parse_ticket_id(payload: &str) -> Option<Uuid> {
    if payload.len() > MAX_PAYLOAD_LENGTH {
        return None;
    }
    Uuid::parse_str(candidate_id(payload)).ok()
}
