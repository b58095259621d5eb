//! Route-specific request and response types.
//!
//! Each module owns the raw request shape of one endpoint, its validation,
//! and the JSON shape the endpoint answers with.

pub mod exercises;
pub mod logs;
pub mod users;

/// A request field that failed validation. The message names the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Invalid \"{0}\": field is required")]
    Missing(&'static str),
    #[error("Invalid \"{0}\": expected a number")]
    NotANumber(&'static str),
    #[error("Invalid \"{0}\" date format")]
    InvalidDate(&'static str),
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing(field) | Self::NotANumber(field) | Self::InvalidDate(field) => field,
        }
    }
}

/// Treat empty or whitespace-only form values as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
