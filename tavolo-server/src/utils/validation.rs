//! Input validation helpers
//!
//! Manual bounds checks shared by the cart, the edit path and the staff
//! management handlers. All of them return [`AppError::Validation`] with the
//! offending field named, so the message can be shown in place.

use crate::utils::{AppError, AppResult};

/// Maximum length for free-text notes (order and line notes)
pub const MAX_NOTE_LEN: usize = 500;
/// Maximum length for display names (tables, products, categories)
pub const MAX_NAME_LEN: usize = 120;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i32 = 999;
/// Maximum allowed unit price (€100,000)
pub const MAX_PRICE: f64 = 100_000.0;

/// Validate an optional free-text field against a length limit
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> AppResult<()> {
    if let Some(text) = value
        && text.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{} exceeds maximum length of {} characters",
            field, max_len
        )));
    }
    Ok(())
}

/// Validate a required display name: non-empty after trim, bounded length
pub fn validate_name(value: &str, field: &str) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} must not be empty", field)));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "{} exceeds maximum length of {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Validate a price: finite, non-negative, bounded
pub fn validate_price(value: f64, field: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{} must be a finite number, got {}",
            field, value
        )));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{} must be non-negative, got {}",
            field, value
        )));
    }
    if value > MAX_PRICE {
        return Err(AppError::validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field, MAX_PRICE, value
        )));
    }
    Ok(())
}

/// Validate a quantity: positive, bounded
pub fn validate_quantity(value: i32, field: &str) -> AppResult<()> {
    if value <= 0 {
        return Err(AppError::validation(format!(
            "{} must be positive, got {}",
            field, value
        )));
    }
    if value > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field, MAX_QUANTITY, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_oversized_note() {
        let note = Some("x".repeat(MAX_NOTE_LEN + 1));
        assert!(validate_optional_text(&note, "note", MAX_NOTE_LEN).is_err());
        assert!(validate_optional_text(&None, "note", MAX_NOTE_LEN).is_ok());
    }

    #[test]
    fn rejects_bad_prices_and_quantities() {
        assert!(validate_price(f64::NAN, "price").is_err());
        assert!(validate_price(-1.0, "price").is_err());
        assert!(validate_price(8.5, "price").is_ok());
        assert!(validate_quantity(0, "quantity").is_err());
        assert!(validate_quantity(3, "quantity").is_ok());
    }
}
