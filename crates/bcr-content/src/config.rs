//! Content store client configuration.
//!
//! Defaults point at the Pinata production API. Without a token the
//! client is built in disabled mode and every upload fails fast.

use url::Url;
use zeroize::Zeroizing;

/// Configuration for the content-addressed store.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct ContentStoreConfig {
    /// Pinning API base URL.
    /// Default: <https://api.pinata.cloud>
    pub api_url: Url,
    /// Public gateway used to build retrieval links.
    /// Default: <https://gateway.pinata.cloud/ipfs>
    pub gateway_url: Url,
    /// Bearer token. `None` disables uploads.
    pub api_token: Option<Zeroizing<String>>,
    /// Overall per-upload budget in seconds, retries included.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ContentStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStoreConfig")
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ContentStoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CONTENT_STORE_URL` (default: `https://api.pinata.cloud`)
    /// - `CONTENT_GATEWAY_URL` (default: `https://gateway.pinata.cloud/ipfs`)
    /// - `CONTENT_STORE_TOKEN` (optional; absent disables uploads)
    /// - `CONTENT_STORE_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("CONTENT_STORE_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(Zeroizing::new);
        Ok(Self {
            api_url: env_url("CONTENT_STORE_URL", "https://api.pinata.cloud")?,
            gateway_url: env_url("CONTENT_GATEWAY_URL", "https://gateway.pinata.cloud/ipfs")?,
            api_token,
            timeout_secs: std::env::var("CONTENT_STORE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Configuration pointing at a local mock server (for testing).
    pub fn local_mock(base_uri: &str, token: &str) -> Result<Self, ConfigError> {
        let parse = |raw: &str| {
            Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))
        };
        Ok(Self {
            api_url: parse(base_uri)?,
            gateway_url: parse(&format!("{base_uri}/ipfs"))?,
            api_token: Some(Zeroizing::new(token.to_string())),
            timeout_secs: 5,
        })
    }

    /// Whether uploads are possible with this configuration.
    pub fn uploads_enabled(&self) -> bool {
        self.api_token.is_some()
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("CONTENT_STORE_TOKEN is not a valid header value")]
    InvalidToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mock_builds_valid_config() {
        let cfg = ContentStoreConfig::local_mock("http://127.0.0.1:9100", "jwt").unwrap();
        assert!(cfg.uploads_enabled());
        assert_eq!(cfg.api_url.as_str(), "http://127.0.0.1:9100/");
        assert_eq!(cfg.gateway_url.as_str(), "http://127.0.0.1:9100/ipfs");
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = ContentStoreConfig::local_mock("http://127.0.0.1:9100", "super-secret-jwt").unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("super-secret-jwt"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("BCR_NONEXISTENT_VAR_81723", "https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn env_url_rejects_invalid_url() {
        std::env::set_var("BCR_TEST_BAD_CONTENT_URL", "not a url");
        let result = env_url("BCR_TEST_BAD_CONTENT_URL", "https://example.com");
        std::env::remove_var("BCR_TEST_BAD_CONTENT_URL");
        assert!(result.is_err());
    }
}
