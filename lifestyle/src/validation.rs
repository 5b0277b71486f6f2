use thiserror::Error;

use crate::store::StoreError;

/// Rejected input. Nothing is persisted when one of these is returned.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("amount must be a positive number")]
    InvalidAmount,
    #[error("balance must be a finite, non-negative number")]
    InvalidBalance,
    #[error("invalid phone number")]
    InvalidPhone,
    #[error("verification code must be 6 characters")]
    InvalidCode,
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("invalid time '{0}'")]
    InvalidTime(String),
    #[error("time conflicts with '{0}'")]
    ScheduleConflict(String),
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("{field} must be at most {max}")]
    TooLong { field: &'static str, max: u32 },
    #[error("no record with id '{0}'")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub fn require(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(trimmed.to_string())
}

/// Mainland mobile numbers: a leading 1 followed by ten digits.
pub fn is_valid_phone(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    bytes.len() == 11 && bytes[0] == b'1' && bytes.iter().all(u8::is_ascii_digit)
}

pub fn validate_phone(phone: &str) -> Result<String, ValidationError> {
    let phone = phone.trim();
    if !is_valid_phone(phone) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(phone.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_shape() {
        assert!(is_valid_phone("13812345678"));
        assert!(!is_valid_phone("23812345678"));
        assert!(!is_valid_phone("1381234567"));
        assert!(!is_valid_phone("1381234567a"));
        assert!(validate_phone(" 13812345678 ").is_ok());
    }

    #[test]
    fn require_trims() {
        assert_eq!(require("title", "  Dinner ").unwrap(), "Dinner");
        assert!(matches!(
            require("title", "   "),
            Err(ValidationError::Required("title"))
        ));
    }
}
