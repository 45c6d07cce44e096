//! Property-based tests for the push encryption pipeline.
//!
//! These focus on the invariants that must hold for arbitrary inputs:
//!
//! - The framed record is always exactly 4096 bytes, whatever the
//!   plaintext size, and over-capacity plaintexts are always rejected
//! - Ephemeral agreement never repeats key material across calls
//! - Flexible base64 decoding accepts every encoding a browser might
//!   produce for the same bytes

use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use proptest::prelude::*;

use crate::aes128gcm::{self, MAX_PLAINTEXT_SIZE, RECORD_SIZE};
use crate::ecdh::{self, SharedSecret};
use crate::encoding;
use crate::keys::{AUTH_SECRET_SIZE, PUBLIC_KEY_SIZE};

fn materials() -> (
    SharedSecret,
    [u8; PUBLIC_KEY_SIZE],
    [u8; PUBLIC_KEY_SIZE],
    [u8; AUTH_SECRET_SIZE],
) {
    let receiver = crate::KeyPair::generate().unwrap();
    let receiver_public = crate::keys::decode_public_key(&receiver.public_key).unwrap();
    let agreement = ecdh::agree(&receiver_public).unwrap();
    (
        agreement.shared_secret,
        agreement.ephemeral_public,
        receiver_public,
        [0x42; AUTH_SECRET_SIZE],
    )
}

proptest! {
    /// Every accepted plaintext produces a full 4096-byte frame.
    #[test]
    fn frame_size_is_constant(plaintext in prop::collection::vec(any::<u8>(), 0..256)) {
        let (shared, sender_public, receiver_public, auth) = materials();
        let frame = aes128gcm::encrypt(
            &plaintext,
            &sender_public,
            &receiver_public,
            &shared,
            &auth,
        )
        .unwrap();
        prop_assert_eq!(frame.len(), RECORD_SIZE);
    }

    /// Plaintexts past the single-record capacity always fail.
    #[test]
    fn oversize_plaintext_always_rejected(extra in 1usize..128) {
        let (shared, sender_public, receiver_public, auth) = materials();
        let result = aes128gcm::encrypt(
            &vec![0u8; MAX_PLAINTEXT_SIZE + extra],
            &sender_public,
            &receiver_public,
            &shared,
            &auth,
        );
        prop_assert!(
            matches!(result, Err(crate::WebPushError::PayloadTooLarge { .. })),
            "expected PayloadTooLarge error"
        );
    }

    /// Both base64 alphabets, padded or not, decode to the same bytes.
    #[test]
    fn flexible_decode_accepts_all_encodings(bytes in prop::collection::vec(any::<u8>(), 0..96)) {
        let encodings = [
            STANDARD.encode(&bytes),
            STANDARD.encode(&bytes).trim_end_matches('=').to_string(),
            URL_SAFE.encode(&bytes),
            URL_SAFE_NO_PAD.encode(&bytes),
        ];
        for encoded in encodings {
            prop_assert_eq!(&encoding::decode_flexible(&encoded).unwrap(), &bytes);
        }
    }

    /// Agreement output never repeats: fresh ephemeral keys per call.
    #[test]
    fn ephemeral_material_is_unique(_seed in any::<u8>()) {
        let receiver = crate::KeyPair::generate().unwrap();
        let receiver_public = crate::keys::decode_public_key(&receiver.public_key).unwrap();
        let a = ecdh::agree(&receiver_public).unwrap();
        let b = ecdh::agree(&receiver_public).unwrap();
        prop_assert_ne!(a.ephemeral_public, b.ephemeral_public);
        prop_assert_ne!(a.shared_secret.as_bytes(), b.shared_secret.as_bytes());
    }
}
