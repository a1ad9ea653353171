//! # bcr-crypto: Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for the registry:
//!
//! - **Ed25519** signing and verification for bearer credentials.
//! - **Argon2id** secret hashing with constant-time verification.
//! - **Token Service** issuing, verifying and refreshing stateless
//!   credentials of the form `base64url(claims).base64url(signature)`.
//!
//! ## Crate Policy
//!
//! - Depends only on `bcr-core` internally.
//! - No mocking of cryptographic operations in tests. All tests use real
//!   Ed25519 and real Argon2id (with reduced cost parameters).
//! - Private key and secret material never reaches `Debug` output or logs.

pub mod error;
pub mod secret;
pub mod signing;
pub mod token;

pub use error::{CryptoError, TokenError};
pub use secret::SecretHasher;
pub use signing::{SigningKeyPair, VerifyingKeyHex};
pub use token::{Claims, Credential, TokenService, DEFAULT_TOKEN_TTL_SECS};
