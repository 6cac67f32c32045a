//! Shared primitives for all Rust crates in Grantline.

#![forbid(unsafe_code)]

/// Session identity primitives shared across services.
pub mod identity;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use identity::SessionIdentity;

/// Result type used across Grantline crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated warehouse object identifier.
///
/// Accepts the unquoted-identifier character set (leading letter or
/// underscore, then letters, digits, `_` or `$`) and normalizes to upper
/// case, the way the warehouse catalog stores unquoted names. User-supplied
/// values never reach SQL text directly; identifiers pass through this type
/// and everything else travels as a statement bind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SqlIdentifier(String);

impl SqlIdentifier {
    /// Maximum accepted identifier length.
    pub const MAX_LENGTH: usize = 255;

    /// Validates and normalizes an identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "identifier must not be empty or whitespace".to_owned(),
            ));
        }

        if trimmed.len() > Self::MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "identifier exceeds {} characters",
                Self::MAX_LENGTH
            )));
        }

        let mut chars = trimmed.chars();
        let leading_ok = chars
            .next()
            .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');
        let rest_ok =
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$');

        if !leading_ok || !rest_ok {
            return Err(AppError::Validation(format!(
                "'{trimmed}' is not a valid object identifier"
            )));
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the normalized identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for SqlIdentifier {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<SqlIdentifier> for String {
    fn from(value: SqlIdentifier) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant; no SQL was issued.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The warehouse session could not be established. Fatal at startup.
    #[error("warehouse session unavailable: {0}")]
    SessionUnavailable(String),

    /// A sequence produced no value; logging for the event is skipped.
    #[error("sequence allocation failed: {0}")]
    Allocation(String),

    /// A read or write statement failed in the warehouse engine.
    #[error("query failed: {0}")]
    Query(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::SqlIdentifier;

    #[test]
    fn identifier_rejects_whitespace() {
        assert!(SqlIdentifier::new("   ").is_err());
    }

    #[test]
    fn identifier_rejects_injection_characters() {
        assert!(SqlIdentifier::new("X; DROP DATABASE Y").is_err());
        assert!(SqlIdentifier::new("A'B").is_err());
        assert!(SqlIdentifier::new("1LEADING_DIGIT").is_err());
    }

    #[test]
    fn identifier_normalizes_to_upper_case() {
        let Ok(identifier) = SqlIdentifier::new("analytics_db") else {
            panic!("expected a valid identifier");
        };
        assert_eq!(identifier.as_str(), "ANALYTICS_DB");
    }
}
