//! Signing HTTP client.
//!
//! Turns a `(method, path, body)` triple into either the decoded JSON object
//! returned by the gateway or a classified [`GatewayError`]. Each call makes
//! exactly one attempt; retries belong to the caller or the transport.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use paygate_types::{
    Credentials, GatewayError, HttpMethod, HttpRequest, HttpResponse, HttpTransport, JsonObject,
};

use crate::security;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.paygate.io/v1";

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const UNKNOWN_API_ERROR: &str = "Unknown API error";
const INVALID_JSON_RESPONSE: &str = "Invalid JSON response";

/// HTTP client that authenticates every request with an HMAC signature.
///
/// Generic over `T: HttpTransport` so tests can run against an in-memory
/// transport.
pub struct SigningClient<T: HttpTransport> {
    base_url: String,
    credentials: Credentials,
    transport: T,
    log_requests: bool,
}

impl<T: HttpTransport> SigningClient<T> {
    /// Creates a new client. A trailing `/` on `base_url` is ignored.
    pub fn new(base_url: impl Into<String>, credentials: Credentials, transport: T) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            transport,
            log_requests: false,
        }
    }

    /// Logs every request and response status at `info` instead of `debug`.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub async fn get(&self, path: &str) -> Result<JsonObject, GatewayError> {
        self.request(HttpMethod::Get, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<JsonObject, GatewayError> {
        self.request(HttpMethod::Post, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<JsonObject, GatewayError> {
        self.request(HttpMethod::Put, path, Some(body)).await
    }

    /// Signs, sends, and classifies a single request.
    #[instrument(
        skip(self, method, path, body),
        fields(method = %method, path = without_query(path))
    )]
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<JsonObject, GatewayError> {
        // Compact JSON with sorted keys; these exact bytes are signed and sent.
        let body = body.map(Value::to_string);
        let headers = self.auth_headers(body.as_deref().unwrap_or(""));

        let request = HttpRequest {
            method,
            url: self.url_for(path),
            headers,
            body,
        };

        if self.log_requests {
            info!(url = without_query(&request.url), "sending gateway request");
        } else {
            debug!(url = without_query(&request.url), "sending gateway request");
        }

        let response = self.transport.send(request).await.map_err(|e| {
            warn!(error = %e, "gateway request failed before a response");
            GatewayError::Network(e.message)
        })?;

        if self.log_requests {
            info!(status = response.status, "gateway responded");
        } else {
            debug!(status = response.status, "gateway responded");
        }

        classify_response(response)
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Builds the fixed and per-call authentication headers for `body`.
    fn auth_headers(&self, body: &str) -> Vec<(String, String)> {
        let timestamp = Utc::now().timestamp();
        let nonce = security::generate_nonce();
        let signature = security::sign_request(&self.credentials, timestamp, &nonce, body);

        vec![
            ("Content-Type".into(), "application/json".into()),
            ("Accept".into(), "application/json".into()),
            ("User-Agent".into(), USER_AGENT.into()),
            ("X-API-Key".into(), self.credentials.api_key().to_string()),
            ("X-Timestamp".into(), timestamp.to_string()),
            ("X-Nonce".into(), nonce),
            ("X-Signature".into(), signature),
        ]
    }
}

/// Query strings can carry customer data such as emails; logs get the path only.
fn without_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

/// Maps a raw response to the decoded object or an error.
fn classify_response(response: HttpResponse) -> Result<JsonObject, GatewayError> {
    if response.status >= 400 {
        let message = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|v| error_message(&v))
            .unwrap_or_else(|| UNKNOWN_API_ERROR.to_string());
        return Err(GatewayError::Api {
            status: response.status,
            message,
        });
    }

    match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Object(object)) => Ok(object),
        _ => Err(GatewayError::InvalidResponse(INVALID_JSON_RESPONSE.into())),
    }
}

/// Prefers `message` over `error`.
fn error_message(body: &Value) -> Option<String> {
    ["message", "error"].iter().find_map(|key| match body.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}
