//! # Validation
//!
//! Validators are pure, synchronous and cheap: they run on every save
//! attempt and whenever the unload guard needs to know whether the draft is
//! worth protecting.

use std::collections::BTreeMap;

/// Field path → message
pub type FieldErrors = BTreeMap<String, String>;

/// Verdict for one draft value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: FieldErrors,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: FieldErrors::new(),
        }
    }

    /// Build a verdict from collected errors; valid when there are none
    pub fn from_errors(errors: FieldErrors) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Record an error for `field` (the first message per field wins)
    pub fn with_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
        self.is_valid = false;
        self
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

/// Caller-supplied validity check for a draft
pub trait Validator<T>: Send + Sync {
    fn validate(&self, draft: &T) -> ValidationResult;
}

impl<T, F> Validator<T> for F
where
    F: Fn(&T) -> ValidationResult + Send + Sync,
{
    fn validate(&self, draft: &T) -> ValidationResult {
        self(draft)
    }
}
