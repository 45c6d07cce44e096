//! RFC 8188 record framing and AES-128-GCM payload encryption.
//!
//! This encoding uses exactly one record per message, padded to fill the
//! whole 4096-byte frame regardless of plaintext size:
//!
//! ```text
//! salt (16) || record size (4, big-endian, = 4096) || idlen (1, = 65)
//!           || keyid (sender ephemeral public, 65) || sealed record
//! ```
//!
//! The sealed record is the plaintext, a `0x02` last-record delimiter,
//! and zero padding up to the record capacity, encrypted with the
//! derived content key and nonce (no associated data). Output frames are
//! therefore always exactly [`RECORD_SIZE`] bytes.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Key, Nonce};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::ecdh::SharedSecret;
use crate::kdf::{self, ContentKeys, SALT_SIZE};
use crate::keys::{AUTH_SECRET_SIZE, PUBLIC_KEY_SIZE};
use crate::{Result, WebPushError};

/// Total frame size in bytes; also the value of the record-size field.
pub const RECORD_SIZE: usize = 4096;

/// Size of the AEAD authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Size of the record header (salt, record size, idlen, keyid) in bytes.
pub const HEADER_SIZE: usize = SALT_SIZE + 4 + 1 + PUBLIC_KEY_SIZE;

/// Bytes available for the padded plaintext inside one record.
pub const RECORD_CAPACITY: usize = RECORD_SIZE - TAG_SIZE - HEADER_SIZE;

/// Maximum plaintext length: one byte of the capacity goes to the delimiter.
pub const MAX_PLAINTEXT_SIZE: usize = RECORD_CAPACITY - 1;

/// Padding delimiter marking the last (and only) record.
const PADDING_DELIMITER: u8 = 0x02;

/// Encrypt a plaintext into a complete 4096-byte framed record.
///
/// Derives the content keys from the agreement output, draws a fresh
/// record salt from `OsRng`, and seals one padded record.
///
/// # Errors
///
/// [`WebPushError::PayloadTooLarge`] when the plaintext plus delimiter
/// exceeds [`RECORD_CAPACITY`]; this encoding never splits a message
/// across records, so the caller must shorten the payload.
pub fn encrypt(
    plaintext: &[u8],
    sender_public: &[u8; PUBLIC_KEY_SIZE],
    receiver_public: &[u8; PUBLIC_KEY_SIZE],
    shared_secret: &SharedSecret,
    auth_secret: &[u8; AUTH_SECRET_SIZE],
) -> Result<Vec<u8>> {
    encrypt_with_rng(
        &mut OsRng,
        plaintext,
        sender_public,
        receiver_public,
        shared_secret,
        auth_secret,
    )
}

/// [`encrypt`] with an injectable random source for the record salt.
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
    plaintext: &[u8],
    sender_public: &[u8; PUBLIC_KEY_SIZE],
    receiver_public: &[u8; PUBLIC_KEY_SIZE],
    shared_secret: &SharedSecret,
    auth_secret: &[u8; AUTH_SECRET_SIZE],
) -> Result<Vec<u8>> {
    let salt = kdf::generate_salt_with_rng(rng)?;
    encrypt_with_salt(
        plaintext,
        sender_public,
        receiver_public,
        shared_secret,
        auth_secret,
        &salt,
    )
}

/// Deterministic variant taking a caller-supplied record salt.
///
/// The salt must be fresh per message; reuse with the same shared secret
/// repeats the AES-GCM nonce.
pub fn encrypt_with_salt(
    plaintext: &[u8],
    sender_public: &[u8; PUBLIC_KEY_SIZE],
    receiver_public: &[u8; PUBLIC_KEY_SIZE],
    shared_secret: &SharedSecret,
    auth_secret: &[u8; AUTH_SECRET_SIZE],
    salt: &[u8; SALT_SIZE],
) -> Result<Vec<u8>> {
    let keys = kdf::derive_content_keys(
        shared_secret,
        auth_secret,
        salt,
        receiver_public,
        sender_public,
    )?;
    seal_record(plaintext, &keys, salt, sender_public)
}

/// Pad the plaintext to the record capacity and seal the frame.
fn seal_record(
    plaintext: &[u8],
    keys: &ContentKeys,
    salt: &[u8; SALT_SIZE],
    key_id: &[u8; PUBLIC_KEY_SIZE],
) -> Result<Vec<u8>> {
    if plaintext.len() + 1 > RECORD_CAPACITY {
        return Err(WebPushError::PayloadTooLarge {
            size: plaintext.len(),
            max: MAX_PLAINTEXT_SIZE,
        });
    }

    let mut padded = Vec::with_capacity(RECORD_CAPACITY);
    padded.extend_from_slice(plaintext);
    padded.push(PADDING_DELIMITER);
    padded.resize(RECORD_CAPACITY, 0);

    let cipher = Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(keys.cek()));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(keys.nonce()), padded.as_ref())
        .map_err(|_| WebPushError::Encryption)?;
    padded.zeroize();

    let mut record = Vec::with_capacity(RECORD_SIZE);
    record.extend_from_slice(salt);
    record.extend_from_slice(&(RECORD_SIZE as u32).to_be_bytes());
    record.push(PUBLIC_KEY_SIZE as u8);
    record.extend_from_slice(key_id);
    record.extend_from_slice(&ciphertext);
    debug_assert_eq!(record.len(), RECORD_SIZE);
    Ok(record)
}
