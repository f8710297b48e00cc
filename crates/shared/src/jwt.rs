//! Operator session tokens (HS256 JWT).
//!
//! A session token is issued after a successful PIN check and must accompany
//! every issuance, scan and admin request. Tokens are stateless; they expire
//! after `session_expiry_secs`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Minimum accepted length of the signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted session lifetime: 30 days.
pub const MAX_EXPIRY_SECS: i64 = 30 * 24 * 60 * 60;

/// Default leeway in seconds for clock skew tolerance.
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Audience claim stamped on every session token.
const SESSION_AUDIENCE: &str = "ticket-desk-operator";

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Operator identity; recorded as the actor of status changes.
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Unique token identifier
    pub jti: String,
    pub aud: String,
}

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub jti: String,
    pub expires_in: i64,
}

/// Signs and validates operator session tokens.
#[derive(Clone)]
pub struct SessionSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    pub expiry_secs: i64,
    pub leeway_secs: u64,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("expiry_secs", &self.expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl SessionSigner {
    /// Creates a signer from a shared secret.
    ///
    /// Rejects secrets shorter than [`MIN_SECRET_LEN`] bytes.
    pub fn new(secret: &str, expiry_secs: i64, leeway_secs: u64) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::InvalidKey(format!(
                "session secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
            leeway_secs,
        })
    }

    /// Issues a session token for the given operator.
    pub fn issue(&self, subject: &str) -> Result<IssuedSession, JwtError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();

        let exp = Duration::try_seconds(self.expiry_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                JwtError::EncodingError(format!(
                    "session expiry of {} seconds is out of range",
                    self.expiry_secs
                ))
            })?;

        let claims = SessionClaims {
            sub: subject.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
            aud: SESSION_AUDIENCE.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok(IssuedSession {
            token,
            jti,
            expires_in: self.expiry_secs,
        })
    }

    /// Validates a token and returns its claims.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;
        validation.set_audience(&[SESSION_AUDIENCE]);

        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidToken
                    | jsonwebtoken::errors::ErrorKind::InvalidSignature
                    | jsonwebtoken::errors::ErrorKind::InvalidAudience => JwtError::InvalidToken,
                    _ => JwtError::DecodingError(e.to_string()),
                }
            })?;

        if token_data.claims.sub.is_empty() {
            return Err(JwtError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}
