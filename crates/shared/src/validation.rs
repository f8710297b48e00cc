//! Common validation utilities.

use validator::ValidationError;

/// Shortest PIN accepted at login.
pub const MIN_PIN_LENGTH: usize = 4;

/// Longest PIN accepted at login.
pub const MAX_PIN_LENGTH: usize = 12;

/// Validates that a text field contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a PIN is 4-12 ASCII digits.
pub fn validate_pin_format(pin: &str) -> Result<(), ValidationError> {
    let len_ok = (MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&pin.len());
    if len_ok && pin.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("pin_format");
        err.message = Some(
            format!(
                "PIN must be {}-{} digits",
                MIN_PIN_LENGTH, MAX_PIN_LENGTH
            )
            .into(),
        );
        Err(err)
    }
}
