//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps [`RegistryError`] and friends to HTTP status codes with a JSON
//! body of the form `{"error": {"code", "message"}}`. Internal error
//! details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bcr_registry::RegistryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "INVALID_TRANSITION").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown identity or wrong secret at login (401).
    #[error("invalid identity or secret")]
    InvalidCredentials,

    /// Missing, malformed, or expired bearer credential (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not permitted (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found or not visible to the caller (404).
    #[error("{0} not found")]
    NotFound(String),

    /// Lifecycle event not allowed for this caller and status (409).
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Project attributes are frozen (423).
    #[error("resource locked: {0}")]
    ResourceLocked(String),

    /// Content kind cannot be attached in the current status (409).
    #[error("invalid attachment point: {0}")]
    InvalidAttachmentPoint(String),

    /// Uniqueness violation (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body or query could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The content store is unreachable or disabled (503).
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::InvalidTransition(_) => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            Self::ResourceLocked(_) => (StatusCode::LOCKED, "RESOURCE_LOCKED"),
            Self::InvalidAttachmentPoint(_) => (StatusCode::CONFLICT, "INVALID_ATTACHMENT_POINT"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::UpstreamUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidCredentials => Self::InvalidCredentials,
            RegistryError::Unauthorized(m) => Self::Unauthorized(m),
            RegistryError::Forbidden(m) => Self::Forbidden(m),
            RegistryError::NotFound(m) => Self::NotFound(m),
            RegistryError::InvalidTransition(m) => Self::InvalidTransition(m),
            RegistryError::ResourceLocked(m) => Self::ResourceLocked(m),
            RegistryError::InvalidAttachmentPoint(m) => Self::InvalidAttachmentPoint(m),
            RegistryError::Conflict(m) => Self::Conflict(m),
            RegistryError::Validation(e) => Self::Validation(e.to_string()),
            RegistryError::UpstreamUnavailable(m) => Self::UpstreamUnavailable(m),
            RegistryError::Internal(m) => Self::Internal(m),
        }
    }
}

impl From<bcr_core::ValidationError> for AppError {
    fn from(err: bcr_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<bcr_crypto::TokenError> for AppError {
    fn from(err: bcr_crypto::TokenError) -> Self {
        Self::Unauthorized(err.to_string())
    }
}
