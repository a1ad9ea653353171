//! # Secret Hashing
//!
//! Argon2id hashing for principal secrets. Hashes are stored as PHC
//! strings (`$argon2id$v=19$m=...`), so verification reads its cost
//! parameters from the stored hash rather than from the hasher.
//!
//! Verification goes through `argon2`'s `PasswordVerifier`, which compares
//! digests in constant time.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::CryptoError;

/// Argon2id hasher with fixed cost parameters.
#[derive(Clone)]
pub struct SecretHasher {
    argon: Argon2<'static>,
}

impl SecretHasher {
    /// Hasher with explicit cost parameters.
    ///
    /// `memory_kib` must be at least 8 and `iterations` at least 1.
    pub fn with_params(memory_kib: u32, iterations: u32) -> Result<Self, CryptoError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| CryptoError::Hashing(e.to_string()))?;
        Ok(Self {
            argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a secret with a fresh random salt. Returns a PHC string.
    pub fn hash(&self, secret: &str) -> Result<String, CryptoError> {
        let salt = SaltString::generate(&mut rand_core::OsRng);
        self.argon
            .hash_password(secret.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| CryptoError::Hashing(e.to_string()))
    }

    /// Check a candidate secret against a stored PHC hash.
    ///
    /// A malformed stored hash verifies as `false`.
    pub fn verify(&self, stored_hash: &str, candidate: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "stored secret hash is not a valid PHC string");
                false
            }
        }
    }
}

impl Default for SecretHasher {
    /// OWASP-recommended Argon2id parameters (19 MiB, 2 iterations).
    fn default() -> Self {
        Self {
            argon: Argon2::default(),
        }
    }
}

impl std::fmt::Debug for SecretHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretHasher").finish_non_exhaustive()
    }
}
