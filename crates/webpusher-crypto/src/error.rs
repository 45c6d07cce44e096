//! Error types for Web Push encryption and VAPID signing.

use thiserror::Error;

/// Errors that can occur while encrypting a push message or building a
/// VAPID authorization header.
///
/// Every error is terminal for the current message or token-build attempt:
/// no partial output is ever returned alongside an error, and per-message
/// material (salt, ephemeral key) must be regenerated before retrying.
#[derive(Error, Debug)]
pub enum WebPushError {
    /// The secure random source failed.
    #[error("Secure random source failed: {0}")]
    Randomness(String),

    /// Malformed base64 key material.
    #[error("Invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// Key material has the wrong length.
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// A decoded point does not satisfy the P-256 curve equation.
    #[error("Public key point is not on the P-256 curve")]
    NotOnCurve,

    /// Plaintext plus padding delimiter does not fit in a single record.
    #[error("Payload too large: {size} bytes exceeds the {max}-byte single-record capacity")]
    PayloadTooLarge {
        /// Plaintext length supplied by the caller.
        size: usize,
        /// Maximum plaintext length a record can carry.
        max: usize,
    },

    /// HKDF produced less output than requested.
    #[error("Key derivation produced a short or invalid output")]
    KeyDerivation,

    /// AEAD encryption failed.
    #[error("AES-128-GCM encryption failed")]
    Encryption,

    /// The `exp` claim is not strictly in the future.
    #[error("Claim expiry {expiry} is not after the current time {now}")]
    ExpiredClaim {
        /// The rejected expiry timestamp.
        expiry: u64,
        /// The current unix time used for validation.
        now: u64,
    },

    /// The `exp` claim is more than 24 hours ahead.
    #[error("Claim expiry {expiry} exceeds the maximum allowed {max}")]
    ClaimTooFarInFuture {
        /// The rejected expiry timestamp.
        expiry: u64,
        /// The latest acceptable expiry.
        max: u64,
    },

    /// The `sub` claim is not a `mailto:` or `https://` contact.
    #[error("Invalid subscriber claim: {0}")]
    InvalidSubscriberClaim(String),

    /// The endpoint URL cannot be parsed into an audience origin.
    #[error("Invalid push endpoint: {0}")]
    InvalidEndpoint(String),

    /// ECDSA token signing failed.
    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Result type for Web Push operations.
pub type Result<T> = std::result::Result<T, WebPushError>;
