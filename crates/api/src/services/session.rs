//! Operator login.

use domain::models::{CreateSessionRequest, SessionResponse};
use shared::jwt::SessionSigner;
use shared::pin::verify_pin;

use crate::error::ApiError;

/// Verifies the PIN against the configured hash and issues a session token.
///
/// Argon2 verification is CPU-bound and runs on the blocking pool.
pub async fn login(
    signer: &SessionSigner,
    pin_hash: &str,
    request: CreateSessionRequest,
) -> Result<SessionResponse, ApiError> {
    let subject = request.subject();
    let pin = request.pin;
    let hash = pin_hash.to_string();

    let verified = tokio::task::spawn_blocking(move || verify_pin(&pin, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("PIN verification task failed: {}", e)))?
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if !verified {
        tracing::warn!(operator = %subject, "Rejected operator PIN");
        return Err(ApiError::Unauthorized("Invalid PIN".to_string()));
    }

    let issued = signer
        .issue(&subject)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!(operator = %subject, jti = %issued.jti, "Operator session issued");
    Ok(SessionResponse::bearer(issued.token, issued.expires_in))
}
