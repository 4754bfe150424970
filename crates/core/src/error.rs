//! Errors raised by pricing, scheduling and reporting.
//!
//! Storage and transport failures are not modeled here; the revenue crate
//! degrades on those instead of failing.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input was rejected (unknown product, unknown interval, bad quantity...).
    ///
    /// Fatal for the invoice or line being processed; nothing partial is produced.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Minor-unit or calendar arithmetic left its representable range.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// True for failures caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidId(_))
    }
}
