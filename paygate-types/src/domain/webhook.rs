use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A verified inbound webhook event.
///
/// The payload is opaque past signature verification; the only guarantee is
/// that it parsed as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebhookEvent(Value);

impl WebhookEvent {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// Event type, read from `type` and falling back to `event`.
    pub fn event_type(&self) -> Option<&str> {
        self.0
            .get("type")
            .or_else(|| self.0.get("event"))
            .and_then(Value::as_str)
    }

    pub fn data(&self) -> Option<&Value> {
        self.0.get("data")
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}
