//! HKDF-SHA256 derivation chain for the aes128gcm content encoding.
//!
//! Three stages turn the ECDH output into the record's encryption
//! material, per RFC 8291 §3.3-3.4:
//!
//! 1. `HKDF-Extract(salt = auth_secret, ikm = shared_secret)` expanded
//!    with `"WebPush: info\0" || receiver_public || sender_public` into
//!    32 bytes of input keying material
//! 2. `HKDF(salt = record_salt, ikm)` expanded with
//!    `"Content-Encoding: aes128gcm\0"` into the 16-byte content key
//! 3. the same PRK expanded with `"Content-Encoding: nonce\0"` into the
//!    12-byte nonce
//!
//! The 16-byte record salt is drawn fresh per message and shared between
//! stages 2 and 3. Derived material is zeroized on drop.

use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::ecdh::SharedSecret;
use crate::keys::{AUTH_SECRET_SIZE, PUBLIC_KEY_SIZE};
use crate::{Result, WebPushError};

/// Size of the per-message record salt in bytes.
pub const SALT_SIZE: usize = 16;

/// Size of the derived input keying material in bytes.
pub const IKM_SIZE: usize = 32;

/// Size of the AES-128-GCM content-encryption key in bytes.
pub const CEK_SIZE: usize = 16;

/// Size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

const IKM_INFO_PREFIX: &[u8] = b"WebPush: info\0";
const CEK_INFO: &[u8] = b"Content-Encoding: aes128gcm\0";
const NONCE_INFO: &[u8] = b"Content-Encoding: nonce\0";

/// Content-encryption key and nonce for one record.
///
/// Zeroized on drop; single-use alongside the salt they were derived from.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ContentKeys {
    cek: [u8; CEK_SIZE],
    nonce: [u8; NONCE_SIZE],
}

impl ContentKeys {
    /// The AES-128-GCM key.
    pub fn cek(&self) -> &[u8; CEK_SIZE] {
        &self.cek
    }

    /// The AES-GCM nonce.
    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }
}

impl std::fmt::Debug for ContentKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentKeys([REDACTED])")
    }
}

/// Draw a fresh 16-byte record salt from the operating system CSPRNG.
///
/// # Errors
///
/// Returns [`WebPushError::Randomness`] if the entropy source fails.
pub fn generate_salt() -> Result<[u8; SALT_SIZE]> {
    generate_salt_with_rng(&mut OsRng)
}

/// [`generate_salt`] with an injectable random source.
pub fn generate_salt_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Result<[u8; SALT_SIZE]> {
    let mut salt = [0u8; SALT_SIZE];
    rng.try_fill_bytes(&mut salt)
        .map_err(|e| WebPushError::Randomness(e.to_string()))?;
    Ok(salt)
}

/// Stage 1: derive the input keying material.
///
/// The auth secret acts as the extract salt; the info string binds both
/// parties' public points so a swapped key cannot yield a usable IKM.
pub fn derive_ikm(
    shared_secret: &SharedSecret,
    auth_secret: &[u8; AUTH_SECRET_SIZE],
    receiver_public: &[u8; PUBLIC_KEY_SIZE],
    sender_public: &[u8; PUBLIC_KEY_SIZE],
) -> Result<[u8; IKM_SIZE]> {
    let mut info = Vec::with_capacity(IKM_INFO_PREFIX.len() + 2 * PUBLIC_KEY_SIZE);
    info.extend_from_slice(IKM_INFO_PREFIX);
    info.extend_from_slice(receiver_public);
    info.extend_from_slice(sender_public);

    let hk = Hkdf::<Sha256>::new(Some(auth_secret), shared_secret.as_bytes());
    let mut ikm = [0u8; IKM_SIZE];
    hk.expand(&info, &mut ikm)
        .map_err(|_| WebPushError::KeyDerivation)?;
    Ok(ikm)
}

/// Stages 2 and 3: derive the content-encryption key and nonce.
///
/// Runs [`derive_ikm`] internally, then expands the record salt PRK twice.
/// Output lengths are fixed; a short read from HKDF is a fatal
/// [`WebPushError::KeyDerivation`].
pub fn derive_content_keys(
    shared_secret: &SharedSecret,
    auth_secret: &[u8; AUTH_SECRET_SIZE],
    salt: &[u8; SALT_SIZE],
    receiver_public: &[u8; PUBLIC_KEY_SIZE],
    sender_public: &[u8; PUBLIC_KEY_SIZE],
) -> Result<ContentKeys> {
    let mut ikm = derive_ikm(shared_secret, auth_secret, receiver_public, sender_public)?;

    let hk = Hkdf::<Sha256>::new(Some(salt), &ikm);
    let mut cek = [0u8; CEK_SIZE];
    hk.expand(CEK_INFO, &mut cek)
        .map_err(|_| WebPushError::KeyDerivation)?;
    let mut nonce = [0u8; NONCE_SIZE];
    hk.expand(NONCE_INFO, &mut nonce)
        .map_err(|_| WebPushError::KeyDerivation)?;

    ikm.zeroize();
    Ok(ContentKeys { cek, nonce })
}
