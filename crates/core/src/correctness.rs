//! Boundary validation helpers.
//!
//! These are called at the edges of the system (`execute`, `process`, and constructors
//! of identifier types) so that malformed input is rejected synchronously with a
//! descriptive error, rather than being enqueued and failing deep inside the engine.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrectnessError {
    #[error("invalid string for '{field}': {reason}")]
    InvalidString { field: &'static str, reason: String },
    #[error("'{field}' cannot be empty")]
    EmptyString { field: &'static str },
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Checks that `s` is non-empty and contains no whitespace, as required of every
/// identifier string (symbols, venues, ids).
///
/// # Errors
///
/// Returns [`CorrectnessError`] if `s` is empty or contains whitespace.
pub fn check_valid_string(s: &str, field: &'static str) -> Result<(), CorrectnessError> {
    if s.is_empty() {
        return Err(CorrectnessError::EmptyString { field });
    }
    if s.chars().any(char::is_whitespace) {
        return Err(CorrectnessError::InvalidString {
            field,
            reason: format!("'{s}' contains whitespace"),
        });
    }
    Ok(())
}

/// Checks that `value` is strictly positive.
///
/// # Errors
///
/// Returns [`CorrectnessError`] if `value <= 0`.
pub fn check_positive(value: rust_decimal::Decimal, field: &'static str) -> Result<(), CorrectnessError> {
    if value <= rust_decimal::Decimal::ZERO {
        return Err(CorrectnessError::InvalidValue {
            field,
            reason: format!("{value} is not positive"),
        });
    }
    Ok(())
}

/// Checks that `value` is not negative.
///
/// # Errors
///
/// Returns [`CorrectnessError`] if `value < 0`.
pub fn check_non_negative(
    value: rust_decimal::Decimal,
    field: &'static str,
) -> Result<(), CorrectnessError> {
    if value < rust_decimal::Decimal::ZERO {
        return Err(CorrectnessError::InvalidValue {
            field,
            reason: format!("{value} is negative"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    #[case("BTCUSDT", true)]
    #[case("", false)]
    #[case("BTC USDT", false)]
    fn test_check_valid_string(#[case] input: &str, #[case] expected_ok: bool) {
        assert_eq!(check_valid_string(input, "symbol").is_ok(), expected_ok);
    }

    #[rstest]
    fn test_check_positive() {
        assert!(check_positive(dec!(1.0), "quantity").is_ok());
        assert!(check_positive(dec!(0.0), "quantity").is_err());
        assert!(check_positive(dec!(-1.0), "quantity").is_err());
    }

    #[rstest]
    fn test_check_non_negative() {
        assert!(check_non_negative(dec!(0.0), "commission").is_ok());
        assert!(check_non_negative(dec!(-0.01), "commission").is_err());
    }
}
