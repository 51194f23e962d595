//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{MarketError, MarketResult};

/// Require a non-blank string field, returning it trimmed
pub fn required(value: Option<String>, message: &str) -> MarketResult<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(MarketError::invalid(message)),
    }
}

/// Validate a supplied (not missing) string field
pub fn non_blank(value: String, field: &str) -> MarketResult<String> {
    if value.trim().is_empty() {
        return Err(MarketError::invalid(format!("{} must not be empty", field)));
    }
    Ok(value.trim().to_string())
}

/// Normalize an optional string, mapping blank to `None`
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate email: one `@` between a non-empty local part and domain,
/// no whitespace. Single-label domains such as `localhost` are accepted.
pub fn validate_email(email: &str) -> MarketResult<()> {
    if email.len() > 254 {
        return Err(MarketError::invalid("Email must be at most 254 characters long"));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(MarketError::invalid("Invalid email format"));
    }

    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> MarketResult<()> {
    if password.len() > 128 {
        return Err(MarketError::invalid(
            "Password must be at most 128 characters long",
        ));
    }
    Ok(())
}

/// Validate a listing price
pub fn validate_price(price: f64) -> MarketResult<f64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(MarketError::invalid("Price must be a positive number"));
    }
    Ok(price)
}

/// Validate an image list: at least one entry, none blank
pub fn validate_images(images: Vec<String>) -> MarketResult<Vec<String>> {
    if images.is_empty() {
        return Err(MarketError::invalid("At least one image is required"));
    }
    if images.iter().any(|image| image.trim().is_empty()) {
        return Err(MarketError::invalid("Image references must not be empty"));
    }
    Ok(images)
}

/// Validate a star rating
pub fn validate_rating(rating: i32) -> MarketResult<i32> {
    if !(0..=5).contains(&rating) {
        return Err(MarketError::invalid("Rating must be between 0 and 5"));
    }
    Ok(rating)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required(Some("  T ".into()), "missing").unwrap(), "T");
        assert!(required(Some("   ".into()), "missing").is_err());
        assert!(required(None, "missing").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());
        assert!(validate_email("user@localhost").is_ok());
        assert!(validate_email("user").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("us er@example.com").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert_eq!(validate_price(100.0).unwrap(), 100.0);
        assert!(validate_price(0.0).is_err());
        assert!(validate_price(-5.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_images_and_rating() {
        assert!(validate_images(vec![]).is_err());
        assert!(validate_images(vec!["".into()]).is_err());
        assert!(validate_images(vec!["x".into()]).is_ok());
        assert!(validate_rating(0).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-1).is_err());
    }
}
