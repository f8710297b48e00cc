//! Ticket issuance and public ticket view.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{CreateTicketRequest, IssuedTicketResponse, PublicTicketView};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{Operator, ValidatedJson};
use crate::services::issue_ticket;

/// Parses a ticket id path segment. Anything that is not a UUID names no ticket.
pub(crate) fn parse_ticket_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::NotFound("Ticket not found".to_string()))
}

/// POST /api/v1/tickets
///
/// Issues a ticket and returns it with its QR payload and share URL.
pub async fn create_ticket(
    State(state): State<AppState>,
    operator: Operator,
    ValidatedJson(request): ValidatedJson<CreateTicketRequest>,
) -> Result<(StatusCode, Json<IssuedTicketResponse>), ApiError> {
    let store = state.tickets()?;
    let issued = issue_ticket(
        store,
        request,
        &state.config.server.public_base_url,
        operator.actor(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(issued)))
}

/// GET /api/v1/tickets/:id
///
/// Data for the shareable ticket page. Deleted tickets are not found.
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicTicketView>, ApiError> {
    let store = state.tickets()?;
    let id = parse_ticket_id(&id)?;

    let ticket = store
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;

    Ok(Json(ticket.into()))
}
