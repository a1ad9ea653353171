//! # Ed25519 Signing and Verification
//!
//! Provides the process-wide credential signing key.
//!
//! ## Security Invariant
//!
//! - Private keys are never serialized or logged. [`SigningKeyPair`] does
//!   not implement `Serialize` and its `Debug` output is redacted.
//! - Seeds decoded from hex are zeroized after the key is constructed.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::Zeroize;

use crate::error::CryptoError;

/// An Ed25519 key pair used to sign bearer credentials.
pub struct SigningKeyPair {
    signing_key: SigningKey,
}

/// Hex rendering of a verifying key, for startup logs and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyingKeyHex(pub String);

impl SigningKeyPair {
    /// Generate a new random key pair from the OS CSPRNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand_core::OsRng);
        Self { signing_key }
    }

    /// Create a key pair from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parse a key pair from a 64-character hex seed.
    pub fn from_hex(hex_seed: &str) -> Result<Self, CryptoError> {
        let mut bytes = hex::decode(hex_seed.trim())
            .map_err(|e| CryptoError::KeyError(format!("signing key is not valid hex: {e}")))?;
        if bytes.len() != 32 {
            let len = bytes.len();
            bytes.zeroize();
            return Err(CryptoError::KeyError(format!(
                "signing key must be 32 bytes, got {len}"
            )));
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes);
        bytes.zeroize();
        let pair = Self::from_seed(&seed);
        seed.zeroize();
        Ok(pair)
    }

    /// The public half, as a hex string.
    pub fn verifying_key_hex(&self) -> VerifyingKeyHex {
        VerifyingKeyHex(hex::encode(self.signing_key.verifying_key().to_bytes()))
    }

    /// Sign raw bytes, returning the 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Verify a signature produced by this key pair.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let sig = ed25519_dalek::Signature::from_slice(signature)
            .map_err(|e| CryptoError::VerificationFailed(format!("malformed signature: {e}")))?;
        let vk: VerifyingKey = self.signing_key.verifying_key();
        vk.verify(message, &sig)
            .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
    }
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKeyPair(<private>)")
    }
}
