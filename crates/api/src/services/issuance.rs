//! Ticket issuance.

use domain::models::{share_url, CreateTicketRequest, IssuedTicketResponse};
use persistence::TicketStore;

use crate::error::ApiError;
use crate::middleware::metrics::record_ticket_issued;

/// Persists a validated issuance request and returns the ticket with its QR
/// payload and share URL. There is no retry on store failure.
pub async fn issue_ticket(
    store: &dyn TicketStore,
    request: CreateTicketRequest,
    public_base_url: &str,
    actor: &str,
) -> Result<IssuedTicketResponse, ApiError> {
    let new = request
        .into_new_ticket()
        .ok_or_else(|| ApiError::Validation("date and time are required".to_string()))?;

    let ticket = store.create(new).await?;
    record_ticket_issued();

    tracing::info!(
        ticket_id = %ticket.id,
        event_name = %ticket.event_name,
        operator = %actor,
        "Ticket issued"
    );

    Ok(IssuedTicketResponse {
        qr_payload: ticket.qr_payload(),
        share_url: share_url(public_base_url, ticket.id),
        ticket,
    })
}
