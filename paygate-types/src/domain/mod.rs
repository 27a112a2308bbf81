//! Domain models for the payment gateway client.

pub mod amount;
pub mod credentials;
pub mod currency;
pub mod payment;
pub mod webhook;

pub use amount::{format_amount, from_cents, to_cents};
pub use credentials::Credentials;
pub use currency::{Currency, MAX_AMOUNT, Money, validate_amount};
pub use payment::{Payment, PaymentStatus};
pub use webhook::WebhookEvent;
