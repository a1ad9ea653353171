//! # Token Service
//!
//! Stateless bearer credentials. A credential is
//! `base64url(claims).base64url(signature)` where `claims` is the JSON
//! object `{"sub", "iat", "exp"}` and the signature is Ed25519 over the
//! exact claims bytes carried in the first segment.
//!
//! Nothing is stored server-side. A credential is valid iff its signature
//! verifies under the service key and `now < exp`.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bcr_core::{PrincipalId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;
use crate::signing::SigningKeyPair;

/// Default credential lifetime: 7 days.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Signed claims carried by a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal the credential was issued to.
    pub sub: PrincipalId,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

/// An opaque bearer credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw bearer string received from a client.
    pub fn from_bearer(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The wire form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the wire form.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(<redacted>)")
    }
}

/// Issues, verifies and refreshes bearer credentials.
///
/// Holds only the signing key and the default lifetime. Clone-friendly.
#[derive(Debug, Clone)]
pub struct TokenService {
    key: Arc<SigningKeyPair>,
    ttl: Duration,
}

impl TokenService {
    /// Create a service signing with `key` and issuing credentials that
    /// live for `ttl` unless a caller asks otherwise.
    pub fn new(key: SigningKeyPair, ttl: Duration) -> Self {
        Self {
            key: Arc::new(key),
            ttl,
        }
    }

    /// The default lifetime used by [`refresh`](Self::refresh).
    pub fn default_ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a credential for `principal` expiring `ttl` from now.
    pub fn issue(&self, principal: PrincipalId, ttl: Duration) -> Credential {
        self.issue_at(principal, ttl, Timestamp::now())
    }

    /// Issue a credential as of `now`.
    pub fn issue_at(&self, principal: PrincipalId, ttl: Duration, now: Timestamp) -> Credential {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: principal,
            iat: now.unix_secs(),
            exp: now.plus_secs(ttl_secs).unix_secs(),
        };
        // Serializing a struct of a UUID and two integers cannot fail.
        let claims_bytes = serde_json::to_vec(&claims).unwrap_or_default();
        let signature = self.key.sign(&claims_bytes);
        Credential(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&claims_bytes),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Resolve a credential to the principal it was issued to.
    pub fn verify(&self, credential: &Credential) -> Result<PrincipalId, TokenError> {
        self.verify_at(credential, Timestamp::now())
    }

    /// Verify as of `now`.
    pub fn verify_at(
        &self,
        credential: &Credential,
        now: Timestamp,
    ) -> Result<PrincipalId, TokenError> {
        let claims = self.decode(credential)?;
        if now.unix_secs() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims.sub)
    }

    /// Re-issue a credential for the same principal with the default
    /// lifetime. Expired credentials are accepted; invalid ones are not.
    pub fn refresh(&self, credential: &Credential) -> Result<Credential, TokenError> {
        self.refresh_at(credential, Timestamp::now())
    }

    /// Refresh as of `now`.
    pub fn refresh_at(
        &self,
        credential: &Credential,
        now: Timestamp,
    ) -> Result<Credential, TokenError> {
        let claims = self.decode(credential)?;
        tracing::debug!(principal = %claims.sub, "refreshing credential");
        Ok(self.issue_at(claims.sub, self.ttl, now))
    }

    /// Split, decode and signature-check a credential. Expiry is not
    /// consulted here.
    fn decode(&self, credential: &Credential) -> Result<Claims, TokenError> {
        let (claims_b64, sig_b64) = credential
            .as_str()
            .split_once('.')
            .ok_or_else(|| TokenError::Invalid("expected two segments".into()))?;
        if sig_b64.contains('.') {
            return Err(TokenError::Invalid("expected two segments".into()));
        }
        let claims_bytes = URL_SAFE_NO_PAD
            .decode(claims_b64)
            .map_err(|_| TokenError::Invalid("claims segment is not base64url".into()))?;
        let signature = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| TokenError::Invalid("signature segment is not base64url".into()))?;
        self.key
            .verify(&claims_bytes, &signature)
            .map_err(|_| TokenError::Invalid("bad signature".into()))?;
        serde_json::from_slice(&claims_bytes)
            .map_err(|_| TokenError::Invalid("claims are not well-formed".into()))
    }
}
