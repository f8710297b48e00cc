//! Operator PIN hashing using Argon2id.
//!
//! The service never stores or compares the plaintext PIN. Deployments keep a
//! PHC-formatted Argon2id hash in configuration and every login attempt is
//! verified against it on the server.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Error type for PIN operations.
#[derive(Debug, Error)]
pub enum PinError {
    #[error("Failed to hash PIN: {0}")]
    HashError(String),

    #[error("Failed to verify PIN: {0}")]
    VerifyError(String),

    #[error("Invalid PIN hash format")]
    InvalidHashFormat,
}

/// Argon2id parameters following OWASP recommendations (2024).
/// - Memory: 19456 KiB (19 MiB)
/// - Iterations: 2
/// - Parallelism: 1
const MEMORY_COST: u32 = 19456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

fn create_argon2() -> Result<Argon2<'static>, PinError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PinError::HashError(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a PIN and returns the PHC string to put in `auth.admin_pin_hash`.
///
/// # Example
/// ```
/// use shared::pin::hash_pin;
///
/// let hash = hash_pin("2823").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_pin(pin: &str) -> Result<String, PinError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = create_argon2()?;

    argon2
        .hash_password(pin.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PinError::HashError(e.to_string()))
}

/// Verifies a submitted PIN against the configured hash.
///
/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash itself is
/// unusable. The parameters embedded in the hash are used for verification.
pub fn verify_pin(pin: &str, hash: &str) -> Result<bool, PinError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PinError::InvalidHashFormat)?;

    match Argon2::default().verify_password(pin.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PinError::VerifyError(e.to_string())),
    }
}

/// Returns true if `hash` parses as a PHC string. Used by config validation.
pub fn is_valid_hash(hash: &str) -> bool {
    PasswordHash::new(hash).is_ok()
}
