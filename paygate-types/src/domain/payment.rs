//! Typed payment result.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::GatewayError;

/// Local classification of the gateway's open-ended status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Successful,
    Pending,
    Failed,
    /// A status this client does not recognize.
    Other,
}

impl PaymentStatus {
    /// Maps a raw status string into its bucket. The match is exact.
    pub fn classify(status: &str) -> Self {
        match status {
            "succeeded" | "completed" => PaymentStatus::Successful,
            "pending" | "processing" => PaymentStatus::Pending,
            "failed" | "canceled" => PaymentStatus::Failed,
            _ => PaymentStatus::Other,
        }
    }
}

/// A payment as reported by the gateway.
///
/// Only `id` and `status` are required. Optional fields that arrive in an
/// unexpected shape are left as `None` and kept verbatim in `extra`, so a
/// completed payment is never reported as a failure because of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Amount in minor units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Fields the gateway sent that have no typed counterpart, or whose value
    /// could not be read.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Payment {
    /// Maps a decoded response object into a typed payment.
    ///
    /// Fails only when `id` or `status` is missing or not a string.
    pub fn from_json(mut object: Map<String, Value>) -> Result<Self, GatewayError> {
        let id = required_string(&mut object, "id")?;
        let status = required_string(&mut object, "status")?;

        Ok(Self {
            id,
            status,
            currency: take_lenient(&mut object, "currency", as_text),
            amount: take_lenient(&mut object, "amount", as_minor_units),
            order_id: take_lenient(&mut object, "order_id", as_text),
            metadata: take_lenient(&mut object, "metadata", |v| Some(v.clone())),
            client_secret: take_lenient(&mut object, "client_secret", as_text),
            created_at: take_lenient(&mut object, "created_at", as_timestamp),
            extra: object,
        })
    }

    pub fn status_kind(&self) -> PaymentStatus {
        PaymentStatus::classify(&self.status)
    }

    pub fn is_successful(&self) -> bool {
        self.status_kind() == PaymentStatus::Successful
    }

    pub fn is_pending(&self) -> bool {
        self.status_kind() == PaymentStatus::Pending
    }

    pub fn is_failed(&self) -> bool {
        self.status_kind() == PaymentStatus::Failed
    }
}

impl<'de> Deserialize<'de> for Payment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Payment::from_json(object).map_err(serde::de::Error::custom)
    }
}

fn required_string(object: &mut Map<String, Value>, key: &str) -> Result<String, GatewayError> {
    match object.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(GatewayError::InvalidResponse(format!(
            "Unexpected response format: `{}` must be a string, got {}",
            key, other
        ))),
        None => Err(GatewayError::InvalidResponse(format!(
            "Unexpected response format: missing `{}`",
            key
        ))),
    }
}

/// Removes `key` when `read` understands its value. Nulls are dropped;
/// anything unreadable stays in `object`.
fn take_lenient<T>(
    object: &mut Map<String, Value>,
    key: &str,
    read: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    let value = object.get(key)?;
    if value.is_null() {
        object.remove(key);
        return None;
    }
    let parsed = read(value)?;
    object.remove(key);
    Some(parsed)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Whole numbers only; a fractional value is ambiguous between major and
/// minor units.
fn as_minor_units(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (read as UTC), unix seconds, and
/// unix seconds as a string.
fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(secs) = s.parse::<i64>() {
                return DateTime::from_timestamp(secs, 0);
            }
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}
