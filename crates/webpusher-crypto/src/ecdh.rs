//! Ephemeral ECDH key agreement over P-256.
//!
//! Every agreement generates a brand-new ephemeral key pair; the private
//! scalar never leaves this module and is consumed by the exchange. The
//! caller receives the 32-byte shared X coordinate plus the local public
//! point to embed in the record header as the key id.
//!
//! ## Security Notes
//!
//! - The ephemeral key is single-use: a failed message attempt must call
//!   [`agree`] again rather than reuse a previous result
//! - Remote points are SEC1-validated before any scalar multiplication,
//!   which rejects invalid-curve attack inputs
//! - Shared secrets are zeroized on drop

use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::keys::{self, PUBLIC_KEY_SIZE};
use crate::{Result, WebPushError};

/// Size of the shared ECDH secret in bytes (the X coordinate).
pub const SHARED_SECRET_SIZE: usize = 32;

/// Shared secret derived from an ECDH exchange.
///
/// Input to the HKDF chain, never used directly as an encryption key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    bytes: [u8; SHARED_SECRET_SIZE],
}

impl SharedSecret {
    /// Wrap raw shared-secret bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SHARED_SECRET_SIZE {
            return Err(WebPushError::InvalidKeyLength {
                expected: SHARED_SECRET_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; SHARED_SECRET_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Get the shared secret as bytes, big-endian.
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedSecret([REDACTED])")
    }
}

/// Result of one ephemeral agreement.
#[derive(Debug)]
pub struct Agreement {
    /// The shared X coordinate, fixed 32 bytes big-endian.
    pub shared_secret: SharedSecret,
    /// The local ephemeral public point (uncompressed SEC1), used as the
    /// record key id and in the HKDF info string.
    pub ephemeral_public: [u8; PUBLIC_KEY_SIZE],
}

/// Perform an ephemeral ECDH agreement against a remote public point.
///
/// Decodes and curve-validates `remote_public`, generates a fresh
/// ephemeral key pair from `OsRng`, and returns the shared secret with
/// the local public point.
///
/// # Errors
///
/// [`WebPushError::InvalidKeyEncoding`] for a malformed point encoding,
/// [`WebPushError::NotOnCurve`] for coordinates off the curve.
pub fn agree(remote_public: &[u8]) -> Result<Agreement> {
    agree_with_rng(&mut OsRng, remote_public)
}

/// [`agree`] with an injectable random source.
pub fn agree_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
    remote_public: &[u8],
) -> Result<Agreement> {
    let remote = keys::parse_public_point(remote_public)?;

    let ephemeral = EphemeralSecret::random(rng);
    let local_public = p256::PublicKey::from(&ephemeral);
    let encoded = local_public.to_encoded_point(false);
    let mut ephemeral_public = [0u8; PUBLIC_KEY_SIZE];
    ephemeral_public.copy_from_slice(encoded.as_bytes());

    // The curve arithmetic yields a point on the curve by construction,
    // so the X coordinate is well defined. The ephemeral secret drops at
    // the end of this call and is never reused.
    let shared = ephemeral.diffie_hellman(&remote);
    let shared_secret = SharedSecret::from_bytes(shared.raw_secret_bytes().as_slice())?;

    Ok(Agreement {
        shared_secret,
        ephemeral_public,
    })
}
