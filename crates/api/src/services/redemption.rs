//! Ticket redemption at the door.

use domain::models::{ScanResponse, StatusChange};
use domain::services::parse_ticket_id;
use persistence::{StatusUpdate, StoreError, TicketStore};

use crate::middleware::metrics::record_scan;

/// Redeems the ticket named by a scanned payload.
///
/// The payload may be the bare id or a share URL ending in it. The
/// transition itself is a single conditional update in the store, so
/// concurrent scans of one ticket yield exactly one `success`.
pub async fn redeem(
    store: &dyn TicketStore,
    payload: &str,
    actor: &str,
) -> Result<ScanResponse, StoreError> {
    let response = match parse_ticket_id(payload) {
        None => ScanResponse::invalid(),
        Some(id) => match store.update_status(id, StatusChange::redeem(actor)).await? {
            StatusUpdate::Applied(ticket) => ScanResponse::success(ticket),
            StatusUpdate::Unchanged(ticket) => ScanResponse::used(ticket),
            StatusUpdate::NotFound => ScanResponse::invalid(),
        },
    };

    record_scan(response.outcome);
    tracing::info!(
        outcome = %response.outcome,
        ticket_id = ?response.ticket.as_ref().map(|t| t.id),
        operator = %actor,
        "Ticket scanned"
    );

    Ok(response)
}
