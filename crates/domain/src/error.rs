//! Unified error types for the domain layer
//!
//! Domain operations return `DomainError` so handlers can decide whether a
//! failure is a silent no-op or a user-facing refusal.

use thiserror::Error;

use crate::value_objects::DiceParseError;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A renewable pool (slots, charges, currency) cannot cover the request
    #[error("Insufficient {resource}: need {needed}, have {available}")]
    Insufficient {
        resource: String,
        needed: i64,
        available: i64,
    },

    /// Parse error (for value objects and directive arguments)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// A well-formed directive whose arguments make no sense (negative
    /// counts, empty names).
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an insufficient-resource error
    pub fn insufficient(resource: impl Into<String>, needed: i64, available: i64) -> Self {
        Self::Insufficient {
            resource: resource.into(),
            needed,
            available,
        }
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<DiceParseError> for DomainError {
    fn from(err: DiceParseError) -> Self {
        Self::Parse(err.to_string())
    }
}
