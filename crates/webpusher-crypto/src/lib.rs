//! # webpusher-crypto
//!
//! The cryptographic core for delivering encrypted Web Push messages:
//!
//! - **Message encryption** per RFC 8291 / RFC 8188 `aes128gcm` content
//!   encoding: ephemeral P-256 ECDH, a three-stage HKDF-SHA256 chain, and
//!   AES-128-GCM over a single fixed-size 4096-byte record
//! - **VAPID authentication** per RFC 8292: a self-issued ES256-signed
//!   bearer token carried in the `Authorization` header
//!
//! Subscription storage and HTTP delivery are deliberately out of scope;
//! [`request::build_request`] produces the finished body and header
//! values for whatever transport the application uses.
//!
//! ## Security
//!
//! Shared secrets and derived keys use `zeroize` for memory cleanup.
//! All per-message material (salt, ephemeral key, ECDSA nonce) is drawn
//! fresh from a thread-safe CSPRNG on every call; nothing is cached
//! between messages, so every operation is safe to run concurrently.
//!
//! ## Example
//!
//! ```no_run
//! use webpusher_crypto::{build_request, PushSubscription, RequestOptions};
//!
//! # fn main() -> webpusher_crypto::Result<()> {
//! let vapid_keys = webpusher_crypto::generate_vapid_key_pair()?;
//! let subscription = PushSubscription {
//!     endpoint: "https://fcm.googleapis.com/fcm/send/abc".into(),
//!     p256dh: "BCVxsr7N_eNgVRqvHtD0zTZsEc6-VV-JvLexhqUzORcxaOzi6-AYWXvTBHm4bjyPjs7Vd8pZGH6SRpkNtoIAiw4".into(),
//!     auth: "BTBZMqHH6r4Tts7J_aSIgg".into(),
//! };
//! let options = RequestOptions {
//!     subscriber: Some("mailto:ops@example.com".into()),
//!     ..RequestOptions::default()
//! };
//! let request = build_request(&subscription, b"hello", &vapid_keys, &options)?;
//! // hand request.body and request.headers() to the HTTP transport
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aes128gcm;
pub mod ecdh;
pub mod encoding;
pub mod error;
pub mod kdf;
pub mod keys;
pub mod request;
pub mod vapid;

#[cfg(test)]
mod proptests;

pub use error::{Result, WebPushError};
pub use keys::KeyPair;
pub use request::{
    build_request, PushSubscription, RequestOptions, WebPushRequest, DEFAULT_TTL_SECS,
};
pub use vapid::{build_auth_header, validate_claims, VapidClaims};

/// Generate a long-lived VAPID key pair for application bootstrap.
///
/// Called once per application; the resulting pair is persisted by the
/// caller and reused for every token. Per-message ephemeral keys are
/// generated internally and never exposed.
pub fn generate_vapid_key_pair() -> Result<KeyPair> {
    KeyPair::generate()
}
