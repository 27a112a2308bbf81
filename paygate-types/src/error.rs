//! Error types for the payment gateway client.

/// Errors surfaced by every gateway operation.
///
/// Validation failures (`InvalidCredentials`, `InvalidCurrency`) are raised
/// before any network call. The remaining variants describe what happened
/// after a request was attempted.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Bad construction input, or a malformed email address.
    #[error("{0}")]
    InvalidCredentials(String),

    /// Unsupported currency code, or an amount outside the accepted range.
    #[error("{0}")]
    InvalidCurrency(String),

    /// No response was received from the gateway.
    #[error("Network error: {0}")]
    Network(String),

    /// The gateway answered with a body that is not a JSON object.
    #[error("{0}")]
    InvalidResponse(String),

    /// The gateway answered with a status of 400 or above.
    #[error("API Error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A payment operation failed; the original error is kept as the source.
    #[error("{message}")]
    PaymentFailed {
        message: String,
        #[source]
        source: Option<Box<GatewayError>>,
    },
}

impl GatewayError {
    /// Creates a `PaymentFailed` error without an underlying cause.
    pub fn payment_failed(message: impl Into<String>) -> Self {
        Self::PaymentFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps `cause` into a `PaymentFailed` error, prefixing its message.
    pub fn wrap_payment_failure(prefix: &str, cause: GatewayError) -> Self {
        Self::PaymentFailed {
            message: format!("{}: {}", prefix, cause),
            source: Some(Box::new(cause)),
        }
    }

    /// Returns the HTTP status reported by the gateway, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::PaymentFailed {
                source: Some(cause),
                ..
            } => cause.status_code(),
            _ => None,
        }
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials(_) => "invalid_credentials",
            Self::InvalidCurrency(_) => "invalid_currency",
            Self::Network(_) => "network_error",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Api { .. } => "api_error",
            Self::PaymentFailed { .. } => "payment_failed",
        }
    }

    /// Returns true if the error was raised before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidCredentials(_) | Self::InvalidCurrency(_))
    }
}
