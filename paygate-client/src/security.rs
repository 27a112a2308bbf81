//! Security utilities for request signing and webhook verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use paygate_types::Credentials;

type HmacSha256 = Hmac<Sha256>;

/// Computes a lowercase hex HMAC-SHA256 of `message` keyed with `secret`.
pub fn hmac_sha256_hex(secret: &str, message: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Compares two strings in constant time.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Generates a fresh 16-byte random nonce, hex encoded.
pub fn generate_nonce() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

/// Signs an outbound request: HMAC over `api_key ∥ timestamp ∥ nonce ∥ body`.
pub fn sign_request(credentials: &Credentials, timestamp: i64, nonce: &str, body: &str) -> String {
    let message = format!("{}{}{}{}", credentials.api_key(), timestamp, nonce, body);
    hmac_sha256_hex(credentials.secret_key(), message.as_bytes())
}

/// Signs a webhook payload: HMAC over `payload ∥ timestamp`.
pub fn sign_webhook(payload: &str, timestamp: i64, secret: &str) -> String {
    let message = format!("{}{}", payload, timestamp);
    hmac_sha256_hex(secret, message.as_bytes())
}
