//! Admin ticket management routes.
//!
//! Listing, filtering, trash, restore, permanent deletion and revocation.
//! All routes require an operator session.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{ListTicketsResponse, StatusChange, StatusFilter, Ticket, TicketStats};
use persistence::StatusUpdate;
use serde::Deserialize;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Operator;
use crate::middleware::metrics::record_admin_action;
use crate::routes::tickets::parse_ticket_id;

/// Query parameters for the active ticket list.
#[derive(Debug, Default, Deserialize)]
pub struct ListTicketsQuery {
    /// `all` (default), `valid` or `used`
    #[serde(default)]
    pub status: StatusFilter,
}

fn not_found() -> ApiError {
    ApiError::NotFound("Ticket not found".to_string())
}

/// GET /api/v1/admin/tickets?status=all|valid|used
pub async fn list_tickets(
    State(state): State<AppState>,
    query: Result<Query<ListTicketsQuery>, QueryRejection>,
) -> Result<Json<ListTicketsResponse>, ApiError> {
    let Query(query) = query?;
    let store = state.tickets()?;

    let tickets: Vec<Ticket> = store
        .list_active()
        .await?
        .into_iter()
        .filter(|t| query.status.matches(t))
        .collect();

    Ok(Json(tickets.into()))
}

/// GET /api/v1/admin/tickets/trash
pub async fn list_trash(
    State(state): State<AppState>,
) -> Result<Json<ListTicketsResponse>, ApiError> {
    let store = state.tickets()?;
    Ok(Json(store.list_deleted().await?.into()))
}

/// GET /api/v1/admin/tickets/stats
pub async fn ticket_stats(State(state): State<AppState>) -> Result<Json<TicketStats>, ApiError> {
    let store = state.tickets()?;
    Ok(Json(store.stats().await?))
}

/// POST /api/v1/admin/tickets/:id/revoke
///
/// Marks a ticket used without a scan. Revoking an already used ticket
/// returns it unchanged.
pub async fn revoke_ticket(
    State(state): State<AppState>,
    operator: Operator,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    let store = state.tickets()?;
    let id = parse_ticket_id(&id)?;

    let ticket = match store
        .update_status(id, StatusChange::revoke(operator.actor()))
        .await?
    {
        StatusUpdate::Applied(ticket) => {
            record_admin_action("revoke");
            info!(ticket_id = %id, operator = %operator.actor(), "Ticket revoked");
            ticket
        }
        StatusUpdate::Unchanged(ticket) => ticket,
        StatusUpdate::NotFound => return Err(not_found()),
    };

    Ok(Json(ticket))
}

/// DELETE /api/v1/admin/tickets/:id
///
/// Moves a ticket to the trash.
pub async fn soft_delete_ticket(
    State(state): State<AppState>,
    operator: Operator,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    let store = state.tickets()?;
    let id = parse_ticket_id(&id)?;

    let ticket = store.soft_delete(id).await?.ok_or_else(not_found)?;
    record_admin_action("soft_delete");
    info!(ticket_id = %id, operator = %operator.actor(), "Ticket moved to trash");

    Ok(Json(ticket))
}

/// POST /api/v1/admin/tickets/:id/restore
pub async fn restore_ticket(
    State(state): State<AppState>,
    operator: Operator,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    let store = state.tickets()?;
    let id = parse_ticket_id(&id)?;

    let ticket = store.restore(id).await?.ok_or_else(not_found)?;
    record_admin_action("restore");
    info!(ticket_id = %id, operator = %operator.actor(), "Ticket restored");

    Ok(Json(ticket))
}

/// DELETE /api/v1/admin/tickets/:id/permanent
///
/// Removes the ticket row. Works on active and trashed tickets alike.
pub async fn hard_delete_ticket(
    State(state): State<AppState>,
    operator: Operator,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let store = state.tickets()?;
    let id = parse_ticket_id(&id)?;

    if !store.hard_delete(id).await? {
        return Err(not_found());
    }
    record_admin_action("hard_delete");
    info!(ticket_id = %id, operator = %operator.actor(), "Ticket permanently deleted");

    Ok(StatusCode::NO_CONTENT)
}
