//! Per-message request assembly for the transport collaborator.
//!
//! Runs the whole pipeline for one `(subscription, message)` pair:
//! decode the subscription key material, perform the ephemeral ECDH
//! agreement, derive the content keys, seal the framed record, and sign
//! a VAPID token whose audience is the endpoint origin. The output is a
//! finished request description (body plus header values); actually
//! POSTing it is the transport's job.
//!
//! Nothing here is retained between calls. A failed build must be rerun
//! from scratch so salt and ephemeral key are regenerated.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::keys::{self, KeyPair};
use crate::vapid::{self, VapidClaims};
use crate::{aes128gcm, ecdh, Result, WebPushError};

/// Default `TTL` header value in seconds when the caller has no policy.
pub const DEFAULT_TTL_SECS: u64 = 30;

/// Default VAPID token lifetime (12 hours; the RFC 8292 cap is 24).
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 12 * 60 * 60;

/// A browser push subscription as handed over by the subscriber store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PushSubscription {
    /// Push service endpoint URL; its origin becomes the `aud` claim.
    pub endpoint: String,
    /// Receiver ECDH public key, base64 of unspecified alphabet/padding.
    pub p256dh: String,
    /// Receiver auth secret, same base64 tolerance.
    pub auth: String,
}

/// Caller-tunable knobs for one request build.
#[derive(Clone, Debug)]
pub struct RequestOptions {
    /// `TTL` header value in seconds.
    pub ttl: u64,
    /// Sender contact for the `sub` claim (`mailto:` or `https://`).
    pub subscriber: Option<String>,
    /// Seconds until the VAPID token expires.
    pub token_lifetime: u64,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL_SECS,
            subscriber: None,
            token_lifetime: DEFAULT_TOKEN_LIFETIME_SECS,
        }
    }
}

/// A fully assembled push request, ready for the HTTP transport.
#[derive(Clone, Debug)]
pub struct WebPushRequest {
    /// The endpoint to POST to.
    pub endpoint: String,
    /// The 4096-byte framed ciphertext body.
    pub body: Vec<u8>,
    /// `TTL` header value in seconds.
    pub ttl: u64,
    /// Complete `Authorization` header value.
    pub authorization: String,
}

impl WebPushRequest {
    /// All request headers as name/value pairs.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("TTL", self.ttl.to_string()),
            ("Content-Encoding", "aes128gcm".to_string()),
            ("Content-Type", "application/octet-stream".to_string()),
            ("Content-Length", self.body.len().to_string()),
            ("Authorization", self.authorization.clone()),
        ]
    }
}

/// Derive the `aud` origin (`scheme://host`) from the endpoint URL.
fn endpoint_origin(endpoint: &str) -> Result<String> {
    let url = Url::parse(endpoint).map_err(|e| WebPushError::InvalidEndpoint(e.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| WebPushError::InvalidEndpoint("endpoint has no host".into()))?;
    Ok(format!("{}://{host}", url.scheme()))
}

/// Build a complete encrypted, authenticated push request.
///
/// # Errors
///
/// Any error from key decoding, agreement, derivation, encryption, or
/// token signing aborts the build; no partial request is returned.
pub fn build_request(
    subscription: &PushSubscription,
    plaintext: &[u8],
    vapid_keys: &KeyPair,
    options: &RequestOptions,
) -> Result<WebPushRequest> {
    build_request_with_rng(&mut OsRng, subscription, plaintext, vapid_keys, options)
}

/// [`build_request`] with an injectable random source.
pub fn build_request_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
    subscription: &PushSubscription,
    plaintext: &[u8],
    vapid_keys: &KeyPair,
    options: &RequestOptions,
) -> Result<WebPushRequest> {
    let receiver_public = keys::decode_public_key(&subscription.p256dh)?;
    let auth_secret = keys::decode_auth_secret(&subscription.auth)?;

    let agreement = ecdh::agree_with_rng(rng, &receiver_public)?;
    let body = aes128gcm::encrypt_with_rng(
        rng,
        plaintext,
        &agreement.ephemeral_public,
        &receiver_public,
        &agreement.shared_secret,
        &auth_secret,
    )?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let claims = VapidClaims {
        aud: endpoint_origin(&subscription.endpoint)?,
        exp: Some(now + options.token_lifetime),
        sub: options.subscriber.clone(),
    };
    let authorization = vapid::build_auth_header_with_rng(rng, vapid_keys, &claims)?;

    Ok(WebPushRequest {
        endpoint: subscription.endpoint.clone(),
        body,
        ttl: options.ttl,
        authorization,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding;
    use p256::elliptic_curve::sec1::ToEncodedPoint;
    use p256::SecretKey;

    fn subscription() -> (SecretKey, PushSubscription) {
        let receiver_secret = SecretKey::random(&mut OsRng);
        let point = receiver_secret.public_key().to_encoded_point(false);
        let sub = PushSubscription {
            endpoint: "https://updates.push.services.mozilla.com/wpush/v2/gAAAA".into(),
            p256dh: encoding::encode(point.as_bytes()),
            auth: encoding::encode(&[0x42; 16]),
        };
        (receiver_secret, sub)
    }

    #[test]
    fn test_build_request_shape() {
        let (_, sub) = subscription();
        let vapid_keys = KeyPair::generate().unwrap();
        let options = RequestOptions {
            subscriber: Some("mailto:ops@example.com".into()),
            ..RequestOptions::default()
        };

        let request = build_request(&sub, b"hello", &vapid_keys, &options).unwrap();
        assert_eq!(request.endpoint, sub.endpoint);
        assert_eq!(request.body.len(), aes128gcm::RECORD_SIZE);
        assert!(request.authorization.starts_with("vapid t="));
        assert!(request
            .authorization
            .ends_with(&format!(", k={}", vapid_keys.public_key)));
    }

    #[test]
    fn test_headers() {
        let (_, sub) = subscription();
        let vapid_keys = KeyPair::generate().unwrap();
        let request =
            build_request(&sub, b"hi", &vapid_keys, &RequestOptions::default()).unwrap();

        let headers = request.headers();
        assert!(headers.contains(&("TTL", DEFAULT_TTL_SECS.to_string())));
        assert!(headers.contains(&("Content-Encoding", "aes128gcm".to_string())));
        assert!(headers.contains(&("Content-Type", "application/octet-stream".to_string())));
        assert!(headers.contains(&("Content-Length", "4096".to_string())));
        assert!(headers
            .iter()
            .any(|(name, value)| *name == "Authorization" && value == &request.authorization));
    }

    #[test]
    fn test_audience_is_endpoint_origin() {
        let (_, sub) = subscription();
        let vapid_keys = KeyPair::generate().unwrap();
        let request =
            build_request(&sub, b"hi", &vapid_keys, &RequestOptions::default()).unwrap();

        let token = request
            .authorization
            .strip_prefix("vapid t=")
            .unwrap()
            .split(", k=")
            .next()
            .unwrap();
        let claims_b64 = token.split('.').nth(1).unwrap();
        let claims: VapidClaims =
            serde_json::from_slice(&encoding::decode_unpadded(claims_b64).unwrap()).unwrap();
        assert_eq!(claims.aud, "https://updates.push.services.mozilla.com");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let (_, mut sub) = subscription();
        sub.endpoint = "not a url".into();
        let vapid_keys = KeyPair::generate().unwrap();
        let result = build_request(&sub, b"hi", &vapid_keys, &RequestOptions::default());
        assert!(matches!(result, Err(WebPushError::InvalidEndpoint(_))));
    }

    #[test]
    fn test_ttl_option_flows_through() {
        let (_, sub) = subscription();
        let vapid_keys = KeyPair::generate().unwrap();
        let options = RequestOptions {
            ttl: 2419200,
            ..RequestOptions::default()
        };
        let request = build_request(&sub, b"hi", &vapid_keys, &options).unwrap();
        assert_eq!(request.ttl, 2419200);
        assert!(request.headers().contains(&("TTL", "2419200".to_string())));
    }
}
