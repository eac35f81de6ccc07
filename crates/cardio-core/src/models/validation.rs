//! Field-level checks applied to creation requests.

use thiserror::Error;

/// A creation request carried a value outside its allowed range.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

pub type ValidationResult = Result<(), ValidationError>;

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

pub(crate) fn require_flag(field: &'static str, value: u8) -> ValidationResult {
    if value > 1 {
        return Err(ValidationError::new(field, format!("expected 0 or 1, got {}", value)));
    }
    Ok(())
}

/// Levels are graded 1 (normal) through 3 (well above normal).
pub(crate) fn require_level(field: &'static str, value: u8) -> ValidationResult {
    if !(1..=3).contains(&value) {
        return Err(ValidationError::new(field, format!("expected 1, 2 or 3, got {}", value)));
    }
    Ok(())
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> ValidationResult {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::new(field, format!("must be positive, got {}", value)));
    }
    Ok(())
}
