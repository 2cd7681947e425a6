//! Checks applied to raw form input before it reaches the store.
//!
//! Every validator takes the field as `Option<&str>` so that an absent form
//! field can be told apart from an empty one.

use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{label} is required")]
    Missing { label: &'static str },

    #[error("{label} cannot be empty")]
    Empty { label: &'static str },

    #[error("{label} is too long ({len} > {max})")]
    TooLong {
        label: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{label} is too short ({len} < {min})")]
    TooShort {
        label: &'static str,
        len: usize,
        min: usize,
    },

    #[error("{label} is not a valid number: {value}")]
    MalformedNumber { label: &'static str, value: String },

    #[error("{label} is out of range: {value} not in [{min}, {max}]")]
    OutOfRange {
        label: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Trims `value` and checks it is present, non-empty and at most `max_len`
/// characters long.
pub fn validate_string(
    value: Option<&str>,
    label: &'static str,
    max_len: usize,
) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::Missing { label })?;
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty { label });
    }

    let len = trimmed.chars().count();
    if len > max_len {
        return Err(ValidationError::TooLong {
            label,
            len,
            max: max_len,
        });
    }

    Ok(trimmed.to_string())
}

/// Parses an integer and checks it against inclusive bounds. `None` bounds are
/// unbounded.
pub fn validate_int(
    value: Option<&str>,
    label: &'static str,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<i64, ValidationError> {
    let num = parse_number::<i64>(value, label)?;
    check_range(num, label, min, max)?;
    Ok(num)
}

/// Parses a finite float and checks it against inclusive bounds.
pub fn validate_float(
    value: Option<&str>,
    label: &'static str,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<f64, ValidationError> {
    let num = parse_number::<f64>(value, label)?;
    if !num.is_finite() {
        return Err(ValidationError::MalformedNumber {
            label,
            value: value.unwrap_or_default().to_string(),
        });
    }
    check_range(num, label, min, max)?;
    Ok(num)
}

fn parse_number<T: FromStr>(value: Option<&str>, label: &'static str) -> Result<T, ValidationError> {
    let raw = value.ok_or(ValidationError::Missing { label })?;
    raw.trim()
        .parse::<T>()
        .map_err(|_| ValidationError::MalformedNumber {
            label,
            value: raw.to_string(),
        })
}

fn check_range<T: PartialOrd + Display + Copy>(
    num: T,
    label: &'static str,
    min: Option<T>,
    max: Option<T>,
) -> Result<(), ValidationError> {
    let below = min.is_some_and(|m| num < m);
    let above = max.is_some_and(|m| num > m);

    if below || above {
        return Err(ValidationError::OutOfRange {
            label,
            value: num.to_string(),
            min: min.map_or_else(|| "-inf".to_string(), |m| m.to_string()),
            max: max.map_or_else(|| "inf".to_string(), |m| m.to_string()),
        });
    }

    Ok(())
}
