//! Operator session extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::auth::{authenticate, OperatorSession};

/// Authenticated operator for a handler.
///
/// Uses the session inserted by `require_operator` when present, otherwise
/// validates the bearer token itself.
#[derive(Debug, Clone)]
pub struct Operator(pub OperatorSession);

impl Operator {
    /// Identity recorded as the actor of status changes.
    pub fn actor(&self) -> &str {
        &self.0.subject
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Operator {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<OperatorSession>() {
            return Ok(Operator(session.clone()));
        }

        let signer = state.session_signer()?;
        authenticate(&signer, &parts.headers).map(Operator)
    }
}
