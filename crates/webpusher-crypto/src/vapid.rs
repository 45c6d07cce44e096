//! VAPID token construction and claims validation (RFC 8292).
//!
//! The token is a compact JWT (`header.claims.signature`) signed with
//! ECDSA over P-256 and SHA-256. The header segment is a fixed literal,
//! the claims segment is the canonical JSON of [`VapidClaims`], and the
//! signature is the fixed-width 64-byte `r || s` form, every segment
//! unpadded base64url. The final `Authorization` value carries the token
//! alongside the sender's public key:
//!
//! ```text
//! vapid t=<header>.<claims>.<signature>, k=<publicKey>
//! ```
//!
//! Claims and key shapes are validated before every signing operation;
//! nothing is cached between calls.

use std::time::{SystemTime, UNIX_EPOCH};

use p256::ecdsa::signature::RandomizedSigner;
use p256::ecdsa::{Signature, SigningKey};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::keys::{KeyPair, PRIVATE_KEY_B64_LEN, PUBLIC_KEY_B64_LEN};
use crate::{encoding, Result, WebPushError};

/// The fixed token header: `{"typ":"JWT","alg":"ES256"}`, unpadded
/// base64url. Constant by construction, never recomputed.
pub const JWT_HEADER_B64: &str = "eyJ0eXAiOiJKV1QiLCJhbGciOiJFUzI1NiJ9";

/// Raw signature length: two 32-byte big-endian integers `r || s`.
pub const SIGNATURE_SIZE: usize = 64;

/// Maximum distance of the `exp` claim from the current time (24 hours).
pub const MAX_CLAIM_LIFETIME_SECS: u64 = 24 * 60 * 60;

/// Typed VAPID token claims.
///
/// Serialization order is the declaration order (`aud`, `exp`, `sub`),
/// and absent optional claims are omitted from the JSON entirely, so the
/// signed byte sequence reflects exactly the keys the caller supplied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VapidClaims {
    /// The push service origin this token is addressed to (`scheme://host`).
    pub aud: String,
    /// Token expiry as a unix timestamp; at most 24 hours ahead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    /// Sender contact, a `mailto:` or `https://` URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Validate claims against the current system time.
///
/// # Errors
///
/// [`WebPushError::InvalidSubscriberClaim`] for a `sub` that is neither
/// `mailto:` nor `https://`; [`WebPushError::ExpiredClaim`] when `exp`
/// is not strictly in the future; [`WebPushError::ClaimTooFarInFuture`]
/// when `exp` is more than 24 hours ahead.
pub fn validate_claims(claims: &VapidClaims) -> Result<()> {
    validate_claims_at(claims, unix_now())
}

/// [`validate_claims`] against an explicit current time.
pub fn validate_claims_at(claims: &VapidClaims, now: u64) -> Result<()> {
    if let Some(ref sub) = claims.sub {
        if !sub.starts_with("mailto:") && !sub.starts_with("https://") {
            return Err(WebPushError::InvalidSubscriberClaim(sub.clone()));
        }
    }
    if let Some(exp) = claims.exp {
        if exp <= now {
            return Err(WebPushError::ExpiredClaim { expiry: exp, now });
        }
        let max = now + MAX_CLAIM_LIFETIME_SECS;
        if exp > max {
            return Err(WebPushError::ClaimTooFarInFuture { expiry: exp, max });
        }
    }
    Ok(())
}

/// Validate the shape of a VAPID key pair before signing.
///
/// Checks the exact base64url string lengths (87 public, 43 private) and
/// that both decode cleanly.
pub fn validate_key_pair(keys: &KeyPair) -> Result<()> {
    if keys.public_key.len() != PUBLIC_KEY_B64_LEN {
        return Err(WebPushError::InvalidKeyLength {
            expected: PUBLIC_KEY_B64_LEN,
            actual: keys.public_key.len(),
        });
    }
    if keys.private_key.len() != PRIVATE_KEY_B64_LEN {
        return Err(WebPushError::InvalidKeyLength {
            expected: PRIVATE_KEY_B64_LEN,
            actual: keys.private_key.len(),
        });
    }
    encoding::decode_unpadded(&keys.public_key)?;
    encoding::decode_unpadded(&keys.private_key)?;
    Ok(())
}

/// Build the complete `Authorization` header value for one request.
///
/// Linear pipeline: validate keys, validate claims, encode the claims
/// segment, sign `header.claims` with ECDSA-P256-SHA256, assemble. The
/// ECDSA nonce comes fresh from `OsRng` per signature, so two calls over
/// identical input produce different but equally valid tokens.
pub fn build_auth_header(keys: &KeyPair, claims: &VapidClaims) -> Result<String> {
    build_auth_header_with_rng(&mut OsRng, keys, claims)
}

/// [`build_auth_header`] with an injectable signing-nonce source.
pub fn build_auth_header_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
    keys: &KeyPair,
    claims: &VapidClaims,
) -> Result<String> {
    validate_key_pair(keys)?;
    validate_claims(claims)?;

    let claims_json =
        serde_json::to_vec(claims).map_err(|e| WebPushError::Signing(e.to_string()))?;
    let claims_b64 = encoding::encode(&claims_json);
    let signing_input = format!("{JWT_HEADER_B64}.{claims_b64}");

    let mut private_bytes = encoding::decode_unpadded(&keys.private_key)?;
    let signing_key = SigningKey::from_slice(&private_bytes).map_err(|_| {
        WebPushError::InvalidKeyEncoding("private key is not a valid P-256 scalar".into())
    })?;
    private_bytes.zeroize();

    let signature: Signature = signing_key
        .try_sign_with_rng(rng, signing_input.as_bytes())
        .map_err(|e| WebPushError::Signing(e.to_string()))?;
    let sig_bytes = signature.to_bytes();
    if sig_bytes.len() != SIGNATURE_SIZE {
        // Unreachable for P-256; r and s are each zero-padded to 32 bytes.
        return Err(WebPushError::Signing(format!(
            "expected a {SIGNATURE_SIZE}-byte signature, got {}",
            sig_bytes.len()
        )));
    }

    let token = format!("{signing_input}.{}", encoding::encode(&sig_bytes));
    Ok(format!("vapid t={token}, k={}", keys.public_key))
}
