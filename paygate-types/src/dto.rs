//! Data Transfer Objects (DTOs) shared across the client surface.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A decoded JSON object, as returned by the gateway.
pub type JsonObject = Map<String, Value>;

// ─────────────────────────────────────────────────────────────────────────────
// Result records
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of a credential health check. Never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_info: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CredentialCheck {
    pub fn valid(account_info: JsonObject) -> Self {
        Self {
            valid: true,
            account_info: Some(account_info),
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}
