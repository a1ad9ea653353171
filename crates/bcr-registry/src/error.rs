//! # Registry Errors
//!
//! One taxonomy for every registry operation. The HTTP layer maps each
//! variant to a status code; nothing here knows about HTTP.

use bcr_content::ContentStoreError;
use bcr_core::ValidationError;
use bcr_crypto::{CryptoError, TokenError};
use bcr_state::{Concealment, LifecycleError};
use thiserror::Error;

/// Errors from registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Unknown identity or wrong secret. Deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, or expired credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is known but not allowed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// No such record, or the caller may not know it exists.
    #[error("{0} not found")]
    NotFound(String),

    /// Event not allowed for this caller in this status.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Project attributes are frozen.
    #[error("resource locked: {0}")]
    ResourceLocked(String),

    /// Content kind cannot be attached in the current status.
    #[error("invalid attachment point: {0}")]
    InvalidAttachmentPoint(String),

    /// Uniqueness violation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Input failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The external content store could not be reached or refused the
    /// upload.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Unexpected failure inside the registry.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    /// Error for an operation on a resource the caller cannot see.
    pub fn concealed(concealment: Concealment, what: impl std::fmt::Display) -> Self {
        match concealment {
            Concealment::Forbidden => Self::Forbidden(format!("no access to {what}")),
            Concealment::NotFound => Self::NotFound(what.to_string()),
        }
    }
}

impl From<LifecycleError> for RegistryError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::InvalidTransition { .. } => Self::InvalidTransition(err.to_string()),
            LifecycleError::Locked { .. } => Self::ResourceLocked(err.to_string()),
            LifecycleError::OutsideWindow { .. } => Self::InvalidAttachmentPoint(err.to_string()),
            LifecycleError::Validation(v) => Self::Validation(v),
        }
    }
}

impl From<TokenError> for RegistryError {
    fn from(err: TokenError) -> Self {
        Self::Unauthorized(err.to_string())
    }
}

impl From<CryptoError> for RegistryError {
    fn from(err: CryptoError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ContentStoreError> for RegistryError {
    fn from(err: ContentStoreError) -> Self {
        Self::UpstreamUnavailable(err.to_string())
    }
}
