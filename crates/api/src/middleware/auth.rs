//! Operator authentication middleware.
//!
//! Protected routes require `Authorization: Bearer <session token>` issued by
//! `POST /api/v1/auth/session`.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::jwt::{JwtError, SessionSigner};

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated operator, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSession {
    /// Session subject; recorded as the actor of status changes.
    pub subject: String,
    pub jti: String,
}

/// Returns the token from a `Bearer` Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

/// Validates the bearer token in `headers` with `signer`.
pub fn authenticate(signer: &SessionSigner, headers: &HeaderMap) -> Result<OperatorSession, ApiError> {
    let token = bearer_token(headers)?;
    let claims = signer.validate(token).map_err(|e| match e {
        JwtError::TokenExpired => ApiError::Unauthorized("Session has expired".to_string()),
        _ => ApiError::Unauthorized("Invalid session token".to_string()),
    })?;

    Ok(OperatorSession {
        subject: claims.sub,
        jti: claims.jti,
    })
}

/// Middleware that requires a valid operator session.
pub async fn require_operator(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let signer = match state.session_signer() {
        Ok(signer) => signer,
        Err(err) => return err.into_response(),
    };

    match authenticate(&signer, req.headers()) {
        Ok(session) => {
            tracing::debug!(operator = %session.subject, "Operator authenticated");
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Err(err) => {
            tracing::debug!(error = %err, "Operator authentication failed");
            err.into_response()
        }
    }
}
