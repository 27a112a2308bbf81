//! Payment Gateway facade.
//!
//! Validates caller input, builds request payloads, and hands them to the
//! [`SigningClient`]. Validation errors are returned before any request is
//! sent; everything after that reflects what the gateway or the transport
//! reported.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{NaiveDate, Utc};
use serde_json::{Value, json};
use tracing::{instrument, warn};
use validator::ValidateEmail;

use paygate_types::{
    CredentialCheck, Credentials, Currency, GatewayError, HttpTransport, JsonObject, Money,
    Payment, WebhookEvent, validate_amount,
};

use crate::config::GatewayConfig;
use crate::filters::{self, FilterSchema};
use crate::signing::SigningClient;
use crate::transport::ReqwestTransport;
use crate::{security, webhook};

/// Lifetime of a checkout session when the caller gives no `expires_at`.
pub const CHECKOUT_TTL_SECS: i64 = 1800;

/// Option keys copied into a checkout session payload.
const CHECKOUT_OPTION_KEYS: &[&str] = &[
    "success_url",
    "cancel_url",
    "customer_id",
    "customer_email",
    "payment_methods",
    "metadata",
];

/// Customer fields accepted on create and update.
const CUSTOMER_FIELDS: &[&str] = &["name", "email", "phone", "address", "metadata"];

/// Public entry point for the gateway API.
///
/// Generic over `T: HttpTransport`; production code uses the default
/// reqwest transport.
///
/// The test-mode flag is the only mutable state. It is atomic, so a shared
/// instance never races, but callers toggling it concurrently will observe
/// whichever write landed last.
pub struct PaymentGateway<T: HttpTransport = ReqwestTransport> {
    client: SigningClient<T>,
    default_currency: Currency,
    webhook_tolerance_secs: u64,
    test_mode: AtomicBool,
}

impl PaymentGateway<ReqwestTransport> {
    /// Creates a gateway with default settings.
    pub fn new(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        Self::from_config(GatewayConfig::new(api_key, secret_key))
    }

    /// Creates a gateway over a reqwest transport built from `config`.
    pub fn from_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        let credentials = Credentials::new(config.api_key.clone(), config.secret_key.clone())?;
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::assemble(credentials, &config, transport))
    }
}

impl<T: HttpTransport> PaymentGateway<T> {
    /// Creates a gateway over a caller-supplied transport.
    pub fn with_transport(config: GatewayConfig, transport: T) -> Result<Self, GatewayError> {
        let credentials = Credentials::new(config.api_key.clone(), config.secret_key.clone())?;
        Ok(Self::assemble(credentials, &config, transport))
    }

    fn assemble(credentials: Credentials, config: &GatewayConfig, transport: T) -> Self {
        let client = SigningClient::new(config.base_url.clone(), credentials, transport)
            .with_request_logging(config.log_requests);
        Self {
            client,
            default_currency: config.default_currency,
            webhook_tolerance_secs: config.webhook_tolerance_secs,
            test_mode: AtomicBool::new(false),
        }
    }

    pub fn transport(&self) -> &T {
        self.client.transport()
    }

    pub fn default_currency(&self) -> Currency {
        self.default_currency
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payments
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates and processes a payment.
    ///
    /// Any failure after validation is returned as `PaymentFailed`, with the
    /// original error as its source.
    #[instrument(skip(self, metadata))]
    pub async fn charge(
        &self,
        currency: &str,
        amount: i64,
        metadata: JsonObject,
    ) -> Result<Payment, GatewayError> {
        let money = Money::parse(currency, amount)?;
        let payload = json!({
            "currency": money.currency(),
            "amount": money.amount(),
            "metadata": metadata,
        });

        self.client
            .post("/create-payment", &payload)
            .await
            .and_then(Payment::from_json)
            .map_err(|e| {
                warn!(error = %e, "payment processing failed");
                GatewayError::wrap_payment_failure("Payment processing failed", e)
            })
    }

    /// Creates an unconfirmed payment intent. Caller options are merged last
    /// and win on key collisions.
    pub async fn create_payment_intent(
        &self,
        currency: &str,
        amount: i64,
        options: JsonObject,
    ) -> Result<Payment, GatewayError> {
        let money = Money::parse(currency, amount)?;

        let mut payload = JsonObject::new();
        payload.insert("currency".into(), json!(money.currency()));
        payload.insert("amount".into(), json!(money.amount()));
        payload.insert("confirm".into(), json!(false));
        payload.extend(options);

        let response = self
            .client
            .post("/payment-intents", &Value::Object(payload))
            .await?;
        Payment::from_json(response)
    }

    pub async fn get_payment(&self, payment_id: &str) -> Result<Payment, GatewayError> {
        let response = self
            .client
            .get(&format!("/payments/{}", payment_id))
            .await?;
        Payment::from_json(response)
    }

    pub async fn cancel_payment(
        &self,
        payment_id: &str,
        options: JsonObject,
    ) -> Result<Payment, GatewayError> {
        let response = self
            .client
            .post(
                &format!("/payments/{}/cancel", payment_id),
                &Value::Object(options),
            )
            .await?;
        Payment::from_json(response)
    }

    /// Captures an authorized payment, in full when `amount` is `None`.
    pub async fn capture_payment(
        &self,
        payment_id: &str,
        amount: Option<i64>,
    ) -> Result<Payment, GatewayError> {
        let mut payload = JsonObject::new();
        if let Some(amount) = amount {
            payload.insert("amount".into(), json!(amount));
        }

        let response = self
            .client
            .post(
                &format!("/payments/{}/capture", payment_id),
                &Value::Object(payload),
            )
            .await?;
        Payment::from_json(response)
    }

    /// Refunds a payment, in full when `amount` is `None`.
    pub async fn refund(
        &self,
        payment_id: &str,
        amount: Option<i64>,
        metadata: JsonObject,
    ) -> Result<JsonObject, GatewayError> {
        let mut payload = JsonObject::new();
        payload.insert("payment_id".into(), json!(payment_id));
        payload.insert("metadata".into(), Value::Object(metadata));
        if let Some(amount) = amount {
            validate_amount(amount)?;
            payload.insert("amount".into(), json!(amount));
        }

        self.client.post("/refunds", &Value::Object(payload)).await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Listings & Reporting
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn list_payments(&self, filters: &JsonObject) -> Result<JsonObject, GatewayError> {
        self.get_filtered("/payments", filters::LIST_PAYMENTS, filters, Vec::new())
            .await
    }

    pub async fn get_payments_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        options: &JsonObject,
    ) -> Result<JsonObject, GatewayError> {
        let bounds = vec![
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
        ];
        self.get_filtered(
            "/payments/date-range",
            filters::PAYMENTS_BY_DATE_RANGE,
            options,
            bounds,
        )
        .await
    }

    pub async fn get_payment_statistics(
        &self,
        filters: &JsonObject,
    ) -> Result<JsonObject, GatewayError> {
        self.get_filtered(
            "/payments/statistics",
            filters::PAYMENT_STATISTICS,
            filters,
            Vec::new(),
        )
        .await
    }

    async fn get_filtered(
        &self,
        path: &str,
        schema: FilterSchema,
        filters: &JsonObject,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<JsonObject, GatewayError> {
        params.extend(filters::apply_schema(schema, filters));
        self.client.get(&filters::with_query(path, &params)).await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Checkout
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates a hosted checkout session.
    ///
    /// Sessions expire after [`CHECKOUT_TTL_SECS`] unless the caller supplies
    /// `expires_at`.
    pub async fn create_checkout_session(
        &self,
        currency: &str,
        amount: i64,
        options: JsonObject,
    ) -> Result<JsonObject, GatewayError> {
        let money = Money::parse(currency, amount)?;

        let mut payload = JsonObject::new();
        payload.insert("currency".into(), json!(money.currency()));
        payload.insert("amount".into(), json!(money.amount()));
        for key in CHECKOUT_OPTION_KEYS {
            if let Some(value) = present(&options, key) {
                payload.insert((*key).into(), value.clone());
            }
        }
        let expires_at = present(&options, "expires_at")
            .cloned()
            .unwrap_or_else(|| json!(Utc::now().timestamp() + CHECKOUT_TTL_SECS));
        payload.insert("expires_at".into(), expires_at);

        self.client
            .post("/checkout/sessions", &Value::Object(payload))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Customers
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn create_customer(&self, data: &JsonObject) -> Result<JsonObject, GatewayError> {
        let payload = customer_payload(data)?;
        self.client
            .post("/customers", &Value::Object(payload))
            .await
    }

    pub async fn get_customer(&self, customer_id: &str) -> Result<JsonObject, GatewayError> {
        self.client
            .get(&format!("/customers/{}", customer_id))
            .await
    }

    pub async fn update_customer(
        &self,
        customer_id: &str,
        data: &JsonObject,
    ) -> Result<JsonObject, GatewayError> {
        let payload = customer_payload(data)?;
        self.client
            .put(
                &format!("/customers/{}", customer_id),
                &Value::Object(payload),
            )
            .await
    }

    pub async fn list_customers(&self, filters: &JsonObject) -> Result<JsonObject, GatewayError> {
        self.get_filtered("/customers", filters::LIST_CUSTOMERS, filters, Vec::new())
            .await
    }

    pub async fn get_customer_payments(
        &self,
        customer_id: &str,
        filters: &JsonObject,
    ) -> Result<JsonObject, GatewayError> {
        self.get_filtered(
            &format!("/customers/{}/payments", customer_id),
            filters::CUSTOMER_PAYMENTS,
            filters,
            Vec::new(),
        )
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Account
    // ─────────────────────────────────────────────────────────────────────────────

    /// Health-checks the configured credentials. Never returns an error.
    pub async fn validate_api_credentials(&self) -> CredentialCheck {
        match self.client.get("/account/verify").await {
            Ok(info) => CredentialCheck::valid(info),
            Err(e) => {
                warn!(error = %e, "credential check failed");
                CredentialCheck::invalid(e.to_string())
            }
        }
    }

    pub async fn get_account_info(&self) -> Result<JsonObject, GatewayError> {
        self.client.get("/account").await
    }

    pub async fn get_balance(&self) -> Result<JsonObject, GatewayError> {
        self.client.get("/balance").await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Test Mode
    // ─────────────────────────────────────────────────────────────────────────────

    /// Enables or disables test-mode operations. Returns `self` for chaining.
    pub fn set_test_mode(&self, enabled: bool) -> &Self {
        self.test_mode.store(enabled, Ordering::SeqCst);
        self
    }

    pub fn is_test_mode(&self) -> bool {
        self.test_mode.load(Ordering::SeqCst)
    }

    /// Creates a payment that plays out a named scenario on the gateway.
    pub async fn create_test_payment(
        &self,
        currency: &str,
        amount: i64,
        scenario: &str,
    ) -> Result<Payment, GatewayError> {
        if !self.is_test_mode() {
            return Err(GatewayError::payment_failed(
                "Test mode must be enabled to create test payments",
            ));
        }
        let money = Money::parse(currency, amount)?;
        let payload = json!({
            "currency": money.currency(),
            "amount": money.amount(),
            "scenario": scenario,
            "test_mode": true,
        });

        let response = self.client.post("/test/payments", &payload).await?;
        Payment::from_json(response)
    }

    /// Asks the gateway to deliver a synthetic webhook event.
    pub async fn simulate_webhook(
        &self,
        event_type: &str,
        data: JsonObject,
    ) -> Result<JsonObject, GatewayError> {
        if !self.is_test_mode() {
            return Err(GatewayError::payment_failed(
                "Test mode must be enabled to simulate webhooks",
            ));
        }
        let payload = json!({
            "event_type": event_type,
            "data": data,
            "test_mode": true,
        });

        self.client.post("/test/webhooks", &payload).await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Webhooks
    // ─────────────────────────────────────────────────────────────────────────────

    /// Checks a webhook signature against the current clock.
    ///
    /// Without `timestamp`, the expected signature is computed with the
    /// verification-time clock (see [`webhook::verify_signature`]).
    pub fn verify_webhook_signature(
        &self,
        payload: &str,
        signature: &str,
        timestamp: Option<i64>,
    ) -> bool {
        webhook::verify_signature(
            self.client.credentials().secret_key(),
            payload,
            signature,
            timestamp,
            Utc::now().timestamp(),
            self.webhook_tolerance_secs,
        )
    }

    /// Verifies and parses an inbound webhook.
    pub fn handle_webhook(
        &self,
        payload: &str,
        signature: &str,
        timestamp: Option<i64>,
    ) -> Result<WebhookEvent, GatewayError> {
        if !self.verify_webhook_signature(payload, signature, timestamp) {
            warn!("rejected webhook with invalid signature");
            return Err(GatewayError::payment_failed("Invalid webhook signature"));
        }
        webhook::parse_event(payload)
    }

    /// Produces the signature the gateway would attach to `payload`.
    pub fn sign_webhook(&self, payload: &str, timestamp: i64) -> String {
        security::sign_webhook(payload, timestamp, self.client.credentials().secret_key())
    }
}

/// Returns `options[key]` unless it is absent or null.
fn present<'a>(options: &'a JsonObject, key: &str) -> Option<&'a Value> {
    options.get(key).filter(|v| !v.is_null())
}

/// Copies recognized customer fields, validating `email` when present.
fn customer_payload(data: &JsonObject) -> Result<JsonObject, GatewayError> {
    let mut payload = JsonObject::new();
    for key in CUSTOMER_FIELDS {
        let Some(value) = present(data, key) else {
            continue;
        };
        let value = if *key == "email" {
            normalize_email(value)?
        } else {
            value.clone()
        };
        payload.insert((*key).into(), value);
    }
    Ok(payload)
}

fn normalize_email(value: &Value) -> Result<Value, GatewayError> {
    let invalid = || GatewayError::InvalidCredentials("Invalid email address".into());
    let email = value.as_str().ok_or_else(invalid)?.trim().to_string();
    if !email.validate_email() {
        return Err(invalid());
    }
    Ok(Value::String(email))
}
