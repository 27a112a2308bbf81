//! # Paygate Types
//!
//! Domain types and port traits for the payment gateway client.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Layout
//!
//! - `domain/` - Currency table, validated amounts, payment results, credentials
//! - `ports/` - The HTTP transport trait that adapters implement
//! - `dto/` - JSON object alias and result records
//! - `error/` - The gateway error type

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Credentials, Currency, MAX_AMOUNT, Money, Payment, PaymentStatus, WebhookEvent, currency,
    format_amount, from_cents, to_cents, validate_amount,
};
pub use dto::*;
pub use error::GatewayError;
pub use ports::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
