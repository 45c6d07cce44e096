//! Base64 helpers for Web Push key material.
//!
//! The protocol itself uses unpadded base64url everywhere, but browsers
//! hand out subscription keys in whichever alphabet their Push API
//! implementation picked, with or without `=` padding. [`decode_flexible`]
//! repairs both ambiguities with a documented precedence order instead of
//! ad hoc retry blocks at each call site.

use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::{Result, WebPushError};

/// Encode bytes as unpadded base64url, the protocol's canonical encoding.
pub fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode strict unpadded base64url.
///
/// Used for material this crate produced itself (VAPID keys, token
/// segments), where no alphabet tolerance applies.
pub fn decode_unpadded(input: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|e| WebPushError::InvalidKeyEncoding(e.to_string()))
}

/// Decode base64 of unknown alphabet and padding.
///
/// Repairs the input by appending `=` until its length is a multiple of
/// four, then attempts a standard-alphabet decode and falls back to the
/// URL-safe alphabet. Both failing is an [`WebPushError::InvalidKeyEncoding`].
pub fn decode_flexible(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim_end_matches('=');
    let mut padded = String::with_capacity(trimmed.len() + 3);
    padded.push_str(trimmed);
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    STANDARD
        .decode(&padded)
        .or_else(|_| URL_SAFE.decode(&padded))
        .map_err(|e| WebPushError::InvalidKeyEncoding(e.to_string()))
}
