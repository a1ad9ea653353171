//! Content store client error types.

/// Errors from content store calls.
#[derive(Debug, thiserror::Error)]
pub enum ContentStoreError {
    /// No token configured.
    #[error("content store uploads are disabled (no CONTENT_STORE_TOKEN)")]
    Disabled,
    /// HTTP transport error after retries.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The store answered with a non-2xx status.
    #[error("content store {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The overall upload budget ran out.
    #[error("content store {endpoint} did not complete within {secs}s")]
    Timeout { endpoint: String, secs: u64 },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}
