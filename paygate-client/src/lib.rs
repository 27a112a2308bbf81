//! # Paygate Client SDK
//!
//! A typed Rust client for the payment gateway API.
//!
//! ## Layout
//!
//! - `gateway/` - The [`PaymentGateway`] facade: validation, payloads, typed results
//! - `signing/` - Request signing, transmission, and response classification
//! - `transport/` - reqwest adapter for the transport port
//! - `filters/` - Query-string schemas for listing endpoints
//! - `webhook/` - Inbound webhook verification
//! - `security/` - HMAC, nonce, and constant-time helpers
//! - `config/` - Environment-driven configuration
//!
//! ```no_run
//! use paygate_client::PaymentGateway;
//! use paygate_types::JsonObject;
//!
//! # async fn run() -> Result<(), paygate_types::GatewayError> {
//! let gateway = PaymentGateway::new("pk_live_0123456789", "sk_live_0123456789")?;
//! let payment = gateway.charge("usd", 2999, JsonObject::new()).await?;
//! assert!(payment.is_successful());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod filters;
pub mod gateway;
pub mod security;
pub mod signing;
pub mod transport;
pub mod webhook;

#[cfg(test)]
mod gateway_tests;
#[cfg(test)]
mod mock;

pub use config::{ConfigError, GatewayConfig};
pub use gateway::PaymentGateway;
pub use signing::{DEFAULT_BASE_URL, SigningClient, USER_AGENT};
pub use transport::ReqwestTransport;

// Static helpers that need no client instance
pub use paygate_types::currency::{
    is_supported as is_currency_supported, supported_codes as supported_currencies,
};
pub use paygate_types::{format_amount, from_cents, to_cents};
