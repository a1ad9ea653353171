//! # Error Hierarchy
//!
//! Validation errors for domain primitives, built with `thiserror`.
//! Each variant carries the rejected input so operators can diagnose
//! malformed requests without guesswork.

use thiserror::Error;

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Login identity is not a plausible e-mail address.
    #[error("invalid identity: \"{0}\" (expected an e-mail address such as name@example.com)")]
    InvalidIdentity(String),

    /// Role string is not one of the four registry roles.
    #[error("unknown role: \"{0}\" (expected submitter, reviewer, administrator, or consumer)")]
    UnknownRole(String),

    /// Identifier string is not a UUID.
    #[error("invalid identifier: \"{0}\" (expected a UUID)")]
    InvalidId(String),

    /// A required text field was empty or too short.
    #[error("{field} must be at least {min} characters")]
    TooShort {
        /// Name of the offending field.
        field: &'static str,
        /// Minimum accepted length.
        min: usize,
    },

    /// A text field exceeded its maximum length.
    #[error("{field} must not exceed {max} characters")]
    TooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum accepted length.
        max: usize,
    },

    /// A field held a value outside its accepted domain.
    #[error("{field} {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: &'static str,
    },
}
