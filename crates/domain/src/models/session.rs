//! Operator session DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Session subject used when the login names no station.
pub const DEFAULT_OPERATOR: &str = "admin";

/// Login with the operator PIN.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(custom(function = "shared::validation::validate_pin_format"))]
    pub pin: String,

    /// Optional station label (e.g. "door-1"); recorded as the actor of scans.
    #[validate(length(min = 1, max = 64, message = "operator must be 1-64 characters"))]
    pub operator: Option<String>,
}

impl CreateSessionRequest {
    /// Session subject for this login.
    pub fn subject(&self) -> String {
        self.operator
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_OPERATOR)
            .to_string()
    }
}

/// Issued session token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

impl SessionResponse {
    pub fn bearer(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer",
            expires_in,
        }
    }
}
