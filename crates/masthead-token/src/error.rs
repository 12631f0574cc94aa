//! Error types for token operations.

use masthead_core::Role;
use thiserror::Error;

/// Errors that can occur while deriving or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The role has no identity record in the registry.
    #[error("invalid role: {0}")]
    UnknownRole(String),

    /// The role's identity record or the project secret is empty.
    #[error("incomplete identity for role {0}")]
    IncompleteIdentity(Role),

    /// The day stamp is not an 8-digit calendar date.
    #[error("invalid date {0:?}: expected YYYYMMDD")]
    InvalidDate(String),

    /// No digest implementation could produce a hash.
    #[error("digest backend unavailable: {0}")]
    DigestUnavailable(String),
}

impl TokenError {
    /// Errors that disqualify a single role without aborting verification.
    pub fn is_role_local(&self) -> bool {
        matches!(self, TokenError::UnknownRole(_) | TokenError::IncompleteIdentity(_))
    }
}
