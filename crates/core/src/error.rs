//! Errors shared by every EventDesk domain crate.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Deterministic failure of a domain decision.
///
/// Failures a caller must react to specifically (a full event, a taken email)
/// get their own variant in the owning crate's error enum, which wraps this
/// one for plain input problems.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Rejected input: blank title, zero capacity, malformed time.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A command would leave an aggregate in a state it must never reach.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier did not parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A command targeted an aggregate that was never created.
    #[error("not found")]
    NotFound,
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        assert_eq!(
            DomainError::validation("capacity must be positive").to_string(),
            "validation failed: capacity must be positive"
        );
        assert_eq!(
            DomainError::invalid_id("EventId: bad").to_string(),
            "invalid identifier: EventId: bad"
        );
    }
}
