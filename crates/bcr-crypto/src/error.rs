use thiserror::Error;

/// Errors from key handling and secret hashing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Key material could not be parsed.
    #[error("key error: {0}")]
    KeyError(String),

    /// A signature did not verify.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Secret hashing failed (bad parameters or malformed PHC string).
    #[error("secret hashing failed: {0}")]
    Hashing(String),
}

/// Outcome of verifying a bearer credential.
///
/// `Expired` is only reported when the signature is valid, so a caller
/// seeing `Expired` knows the credential was genuinely issued by this
/// service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed structure, undecodable segments, or a bad signature.
    #[error("invalid credential: {0}")]
    Invalid(String),

    /// Signature is valid but the expiry has passed.
    #[error("credential expired")]
    Expired,
}
