//! Operator session endpoint.

use axum::{extract::State, Json};
use domain::models::{CreateSessionRequest, SessionResponse};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::services::login;

/// POST /api/v1/auth/session
///
/// Exchanges the operator PIN for a bearer session token.
pub async fn create_session(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateSessionRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let signer = state.session_signer()?;
    let response = login(&signer, &state.config.auth.admin_pin_hash, request).await?;
    Ok(Json(response))
}
