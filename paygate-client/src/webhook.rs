//! Inbound webhook verification.
//!
//! A webhook is authentic when its signature equals
//! `HMAC-SHA256(secret, payload ∥ timestamp)` and the timestamp lies within
//! the tolerance window around the verifier's clock, in either direction.

use paygate_types::{GatewayError, WebhookEvent};

use crate::security;

/// Default accepted clock skew between signer and verifier, in seconds.
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

/// Verifies a webhook signature against a fixed `now`.
///
/// When `timestamp` is `None` the expected signature is computed with `now`
/// itself, so only signatures produced in the same second will match.
pub fn verify_signature(
    secret: &str,
    payload: &str,
    signature: &str,
    timestamp: Option<i64>,
    now: i64,
    tolerance_secs: u64,
) -> bool {
    if payload.is_empty() || signature.is_empty() {
        return false;
    }

    let timestamp = timestamp.unwrap_or(now);
    if now.abs_diff(timestamp) > tolerance_secs {
        return false;
    }

    let expected = security::sign_webhook(payload, timestamp, secret);
    security::constant_time_eq(&expected, signature)
}

/// Parses a verified payload. Any valid JSON document is accepted.
pub fn parse_event(payload: &str) -> Result<WebhookEvent, GatewayError> {
    serde_json::from_str(payload)
        .map(WebhookEvent::new)
        .map_err(|_| GatewayError::payment_failed("Invalid webhook payload format"))
}
