//! P-256 key pair generation and key material decoding.
//!
//! One key shape serves two roles: the application's long-lived VAPID
//! identity pair and the per-message ephemeral ECDH pair. Both are NIST
//! P-256; the private scalar is 32 bytes and the public point is the
//! 65-byte uncompressed SEC1 form (`0x04 || X || Y`).
//!
//! ## Security Notes
//!
//! - Key generation draws from `OsRng`
//! - Candidate scalar bytes are zeroized after use
//! - Curve membership is checked on every decoded public point, which
//!   rejects invalid-curve attack inputs before any ECDH happens

use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::SecretKey;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{encoding, Result, WebPushError};

/// Size of a P-256 private scalar in bytes.
pub const PRIVATE_KEY_SIZE: usize = 32;

/// Size of an uncompressed P-256 public point in bytes.
pub const PUBLIC_KEY_SIZE: usize = 65;

/// Size of a subscription auth secret in bytes.
pub const AUTH_SECRET_SIZE: usize = 16;

/// Length of an unpadded base64url private key string.
pub const PRIVATE_KEY_B64_LEN: usize = 43;

/// Length of an unpadded base64url public key string.
pub const PUBLIC_KEY_B64_LEN: usize = 87;

/// SEC1 tag byte for an uncompressed point.
const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

/// A P-256 key pair in the protocol's base64url representation.
///
/// Long-lived when used as a VAPID identity (generated once at
/// application bootstrap, persisted by the caller); single-use when
/// generated as a per-message ephemeral pair.
#[derive(Clone, Serialize, Deserialize)]
pub struct KeyPair {
    /// Private scalar, 43 chars of unpadded base64url (32 bytes).
    pub private_key: String,
    /// Uncompressed public point, 87 chars of unpadded base64url (65 bytes).
    pub public_key: String,
}

impl KeyPair {
    /// Generate a fresh key pair from the operating system CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns [`WebPushError::Randomness`] if the entropy source fails.
    pub fn generate() -> Result<Self> {
        Self::generate_with_rng(&mut OsRng)
    }

    /// Generate a fresh key pair from the supplied random source.
    ///
    /// Candidate scalars outside the curve order are rejected and redrawn,
    /// so the private key is uniform over valid scalars.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let mut candidate = [0u8; PRIVATE_KEY_SIZE];
        loop {
            rng.try_fill_bytes(&mut candidate)
                .map_err(|e| WebPushError::Randomness(e.to_string()))?;
            if let Ok(secret) = SecretKey::from_slice(&candidate) {
                candidate.zeroize();
                let public = secret.public_key().to_encoded_point(false);
                return Ok(Self {
                    private_key: encoding::encode(&secret.to_bytes()),
                    public_key: encoding::encode(public.as_bytes()),
                });
            }
        }
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Parse an uncompressed SEC1 point, enforcing curve membership.
///
/// Shape errors (wrong length, wrong tag byte) are
/// [`WebPushError::InvalidKeyEncoding`]; a well-formed encoding whose
/// coordinates fail the curve equation is [`WebPushError::NotOnCurve`].
pub(crate) fn parse_public_point(bytes: &[u8]) -> Result<p256::PublicKey> {
    if bytes.len() != PUBLIC_KEY_SIZE || bytes[0] != UNCOMPRESSED_POINT_TAG {
        return Err(WebPushError::InvalidKeyEncoding(format!(
            "public key must be {PUBLIC_KEY_SIZE} bytes of uncompressed SEC1, got {} bytes",
            bytes.len()
        )));
    }
    p256::PublicKey::from_sec1_bytes(bytes).map_err(|_| WebPushError::NotOnCurve)
}

/// Decode a subscription-supplied public key into a validated point.
///
/// Tolerates standard or URL-safe base64, with or without padding.
pub fn decode_public_key(encoded: &str) -> Result<[u8; PUBLIC_KEY_SIZE]> {
    let bytes = encoding::decode_flexible(encoded)?;
    parse_public_point(&bytes)?;
    let mut point = [0u8; PUBLIC_KEY_SIZE];
    point.copy_from_slice(&bytes);
    Ok(point)
}

/// Decode a subscription-supplied auth secret (16 bytes).
///
/// Same base64 tolerance as [`decode_public_key`].
pub fn decode_auth_secret(encoded: &str) -> Result<[u8; AUTH_SECRET_SIZE]> {
    let bytes = encoding::decode_flexible(encoded)?;
    if bytes.len() != AUTH_SECRET_SIZE {
        return Err(WebPushError::InvalidKeyLength {
            expected: AUTH_SECRET_SIZE,
            actual: bytes.len(),
        });
    }
    let mut secret = [0u8; AUTH_SECRET_SIZE];
    secret.copy_from_slice(&bytes);
    Ok(secret)
}
