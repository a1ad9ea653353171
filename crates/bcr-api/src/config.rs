//! # Application Configuration
//!
//! Environment-driven. Every variable has a default except the signing
//! key and database URL, whose absence switches the server into its
//! development mode (ephemeral key, in-memory only).

use std::time::Duration;

use bcr_crypto::DEFAULT_TOKEN_TTL_SECS;
use zeroize::Zeroizing;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Application configuration.
///
/// Custom `Debug` redacts the signing key and database URL to prevent
/// credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Hex-encoded Ed25519 seed for credential signing. `None` generates
    /// an ephemeral key at startup.
    pub signing_key_hex: Option<Zeroizing<String>>,
    /// Lifetime of issued credentials.
    pub token_ttl: Duration,
    /// PostgreSQL connection string. `None` runs in-memory only.
    pub database_url: Option<Zeroizing<String>>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "signing_key_hex",
                &self.signing_key_hex.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_ttl", &self.token_ttl)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            signing_key_hex: None,
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
            database_url: None,
            log_format: LogFormat::Text,
        }
    }
}

/// Malformed configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8080)
    /// - `REGISTRY_SIGNING_KEY_HEX` (optional)
    /// - `TOKEN_TTL_SECS` (default: 604800, seven days)
    /// - `DATABASE_URL` (optional)
    /// - `LOG_FORMAT` (`text` or `json`, default: `text`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT") {
            None => defaults.port,
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                expected: "a TCP port number",
                value: raw,
            })?,
        };

        let token_ttl = match non_empty("TOKEN_TTL_SECS") {
            None => defaults.token_ttl,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "TOKEN_TTL_SECS",
                        expected: "a positive number of seconds",
                        value: raw,
                    })
                }
            },
        };

        let log_format = match non_empty("LOG_FORMAT").map(|v| v.trim().to_ascii_lowercase()) {
            None => LogFormat::Text,
            Some(v) if v == "text" => LogFormat::Text,
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    expected: "\"text\" or \"json\"",
                    value: v,
                })
            }
        };

        Ok(Self {
            port,
            signing_key_hex: non_empty("REGISTRY_SIGNING_KEY_HEX").map(Zeroizing::new),
            token_ttl,
            database_url: non_empty("DATABASE_URL").map(Zeroizing::new),
            log_format,
        })
    }
}
