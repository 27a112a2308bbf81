//! PaymentGateway unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::error::Error as _;

    use chrono::{NaiveDate, Utc};
    use serde_json::{Value, json};

    use paygate_types::{GatewayError, HttpMethod, JsonObject};

    use crate::mock::MockTransport;
    use crate::{GatewayConfig, PaymentGateway};

    const API_KEY: &str = "pk_test_0123456789abcd";
    const SECRET: &str = "sk_test_0123456789abcd";

    fn gateway(transport: MockTransport) -> PaymentGateway<MockTransport> {
        let config = GatewayConfig::new(API_KEY, SECRET).with_base_url("https://gateway.test/v1");
        PaymentGateway::with_transport(config, transport).unwrap()
    }

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn query_of(url: &str) -> &str {
        url.split_once('?').map(|(_, q)| q).unwrap_or("")
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_construction_validates_credentials() {
        let ok = PaymentGateway::with_transport(
            GatewayConfig::new("a".repeat(20), "b".repeat(20)),
            MockTransport::new(),
        );
        assert!(ok.is_ok());

        for (key, secret) in [("", SECRET), (API_KEY, "   "), ("short", SECRET)] {
            let err = PaymentGateway::with_transport(
                GatewayConfig::new(key, secret),
                MockTransport::new(),
            )
            .err()
            .expect("construction should fail");
            assert!(matches!(err, GatewayError::InvalidCredentials(_)));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Charge
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_charge_end_to_end() {
        let gw = gateway(MockTransport::new().respond(200, r#"{"id":"pay_1","status":"completed"}"#));

        let payment = gw.charge("usd", 2999, JsonObject::new()).await.unwrap();
        assert_eq!(payment.id, "pay_1");
        assert!(payment.is_successful());

        let req = gw.transport().last_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://gateway.test/v1/create-payment");
        assert_eq!(
            gw.transport().last_body(),
            json!({"currency": "USD", "amount": 2999, "metadata": {}})
        );
    }

    #[tokio::test]
    async fn test_charge_tolerates_loose_optional_fields() {
        let bodies = [
            r#"{"id":"pay_1","status":"completed","created_at":"2024-03-01 12:00:00"}"#,
            r#"{"id":"pay_1","status":"completed","order_id":12345}"#,
            r#"{"id":"pay_1","status":"completed","amount":"2999"}"#,
            r#"{"id":"pay_1","status":"completed","amount":29.99}"#,
        ];
        let transport = bodies
            .iter()
            .fold(MockTransport::new(), |t, body| t.respond(200, body));
        let gw = gateway(transport);

        for body in bodies {
            let payment = gw
                .charge("usd", 2999, JsonObject::new())
                .await
                .unwrap_or_else(|e| panic!("{body} was rejected: {e}"));
            assert!(payment.is_successful());
        }
        assert_eq!(gw.transport().requests().len(), bodies.len());
    }

    #[tokio::test]
    async fn test_charge_validation_sends_nothing() {
        let gw = gateway(MockTransport::new());

        let err = gw.charge("XYZ", 100, JsonObject::new()).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCurrency(_)));

        let err = gw.charge("USD", 0, JsonObject::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Amount must be greater than zero");

        let err = gw
            .charge("USD", 100_000_000, JsonObject::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Amount exceeds maximum allowed limit");

        assert!(gw.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_charge_accepts_maximum_amount() {
        let gw = gateway(MockTransport::new().respond(200, r#"{"id":"pay_max","status":"pending"}"#));
        let payment = gw
            .charge("EUR", 99_999_999, JsonObject::new())
            .await
            .unwrap();
        assert!(payment.is_pending());
    }

    #[tokio::test]
    async fn test_charge_wraps_api_error() {
        let gw = gateway(MockTransport::new().respond(402, r#"{"message":"card declined"}"#));

        let err = gw
            .charge("USD", 500, object(json!({"order_id": "ord_1"})))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::PaymentFailed { .. }));
        assert_eq!(
            err.to_string(),
            "Payment processing failed: API Error (402): card declined"
        );
        assert_eq!(err.status_code(), Some(402));
        let cause = err.source().unwrap();
        assert_eq!(cause.to_string(), "API Error (402): card declined");
    }

    #[tokio::test]
    async fn test_charge_wraps_network_error() {
        let gw = gateway(MockTransport::new().fail("connection reset"));

        let err = gw.charge("GBP", 500, JsonObject::new()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Payment processing failed: Network error: connection reset"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment lifecycle
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_payment_intent_merges_options_last_wins() {
        let gw = gateway(MockTransport::new().respond(
            200,
            r#"{"id":"pi_1","status":"pending","client_secret":"cs_1"}"#,
        ));

        let intent = gw
            .create_payment_intent(
                "eur",
                1500,
                object(json!({"confirm": true, "description": "Order 7"})),
            )
            .await
            .unwrap();
        assert_eq!(intent.client_secret.as_deref(), Some("cs_1"));

        assert_eq!(
            gw.transport().last_body(),
            json!({"currency": "EUR", "amount": 1500, "confirm": true, "description": "Order 7"})
        );
        assert!(gw.transport().last_request().url.ends_with("/payment-intents"));
    }

    #[tokio::test]
    async fn test_payment_intent_defaults_unconfirmed() {
        let gw = gateway(MockTransport::new().respond(200, r#"{"id":"pi_2","status":"pending"}"#));
        gw.create_payment_intent("usd", 100, JsonObject::new())
            .await
            .unwrap();
        assert_eq!(gw.transport().last_body()["confirm"], json!(false));
    }

    #[tokio::test]
    async fn test_get_cancel_capture_paths() {
        let gw = gateway(
            MockTransport::new()
                .respond(200, r#"{"id":"pay_9","status":"processing"}"#)
                .respond(200, r#"{"id":"pay_9","status":"canceled"}"#)
                .respond(200, r#"{"id":"pay_9","status":"succeeded"}"#)
                .respond(200, r#"{"id":"pay_9","status":"succeeded"}"#),
        );

        assert!(gw.get_payment("pay_9").await.unwrap().is_pending());
        let get = gw.transport().last_request();
        assert_eq!(get.method, HttpMethod::Get);
        assert!(get.url.ends_with("/payments/pay_9"));

        let canceled = gw
            .cancel_payment("pay_9", object(json!({"reason": "duplicate"})))
            .await
            .unwrap();
        assert!(canceled.is_failed());
        assert!(gw.transport().last_request().url.ends_with("/payments/pay_9/cancel"));
        assert_eq!(gw.transport().last_body(), json!({"reason": "duplicate"}));

        gw.capture_payment("pay_9", None).await.unwrap();
        assert!(gw.transport().last_request().url.ends_with("/payments/pay_9/capture"));
        assert_eq!(gw.transport().last_body(), json!({}));

        gw.capture_payment("pay_9", Some(1200)).await.unwrap();
        assert_eq!(gw.transport().last_body(), json!({"amount": 1200}));
    }

    #[tokio::test]
    async fn test_get_payment_invalid_shape() {
        let gw = gateway(MockTransport::new().respond(200, r#"{"status":"completed"}"#));
        let err = gw.get_payment("pay_1").await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_refund_payloads() {
        let gw = gateway(MockTransport::new());

        gw.refund("pay_1", None, object(json!({"reason": "customer"})))
            .await
            .unwrap();
        assert!(gw.transport().last_request().url.ends_with("/refunds"));
        assert_eq!(
            gw.transport().last_body(),
            json!({"payment_id": "pay_1", "metadata": {"reason": "customer"}})
        );

        gw.refund("pay_1", Some(250), JsonObject::new()).await.unwrap();
        assert_eq!(
            gw.transport().last_body(),
            json!({"payment_id": "pay_1", "metadata": {}, "amount": 250})
        );

        let err = gw.refund("pay_1", Some(-1), JsonObject::new()).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCurrency(_)));
        assert_eq!(gw.transport().requests().len(), 2);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Listings
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_list_payments_clamps_limit() {
        let gw = gateway(MockTransport::new());
        gw.list_payments(&object(json!({"limit": 999}))).await.unwrap();

        let url = gw.transport().last_request().url;
        assert_eq!(url, "https://gateway.test/v1/payments?limit=100");
        assert!(!url.contains("limit=999"));
    }

    #[tokio::test]
    async fn test_list_payments_normalizes_filters() {
        let gw = gateway(MockTransport::new());
        gw.list_payments(&object(json!({
            "currency": "try",
            "page": "3",
            "unknown": "dropped",
            "status": "completed"
        })))
        .await
        .unwrap();

        let req = gw.transport().last_request();
        assert_eq!(query_of(&req.url), "page=3&status=completed&currency=TRY");
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn test_list_without_filters_has_no_query() {
        let gw = gateway(MockTransport::new());
        gw.list_payments(&JsonObject::new()).await.unwrap();
        assert_eq!(
            gw.transport().last_request().url,
            "https://gateway.test/v1/payments"
        );
    }

    #[tokio::test]
    async fn test_payments_by_date_range() {
        let gw = gateway(MockTransport::new());
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        gw.get_payments_by_date_range(start, end, &object(json!({"limit": 500, "sort": "x"})))
            .await
            .unwrap();

        let url = gw.transport().last_request().url;
        assert!(url.contains("/payments/date-range?"));
        assert_eq!(
            query_of(&url),
            "start_date=2024-01-01&end_date=2024-01-31&limit=100"
        );
    }

    #[tokio::test]
    async fn test_statistics_group_by() {
        let gw = gateway(MockTransport::new());

        gw.get_payment_statistics(&object(json!({"group_by": "week", "currency": "usd"})))
            .await
            .unwrap();
        assert_eq!(
            query_of(&gw.transport().last_request().url),
            "currency=USD&group_by=week"
        );

        gw.get_payment_statistics(&object(json!({"group_by": "fortnight"})))
            .await
            .unwrap();
        assert_eq!(
            gw.transport().last_request().url,
            "https://gateway.test/v1/payments/statistics"
        );
    }

    #[tokio::test]
    async fn test_customer_listings() {
        let gw = gateway(MockTransport::new());

        gw.list_customers(&object(json!({"search": "jane", "limit": 150})))
            .await
            .unwrap();
        assert_eq!(
            query_of(&gw.transport().last_request().url),
            "limit=100&search=jane"
        );

        gw.get_customer_payments("cus_1", &object(json!({"status": "failed"})))
            .await
            .unwrap();
        assert!(
            gw.transport()
                .last_request()
                .url
                .ends_with("/customers/cus_1/payments?status=failed")
        );
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Checkout
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_checkout_session_default_expiry() {
        let gw = gateway(MockTransport::new().respond(200, r#"{"id":"cs_1","url":"https://pay"}"#));

        let session = gw
            .create_checkout_session(
                "usd",
                4200,
                object(json!({
                    "success_url": "https://shop/ok",
                    "cancel_url": "https://shop/cancel",
                    "customer_email": null,
                    "ignored": 1
                })),
            )
            .await
            .unwrap();
        assert_eq!(session.get("id"), Some(&json!("cs_1")));

        let body = gw.transport().last_body();
        assert_eq!(body["currency"], json!("USD"));
        assert_eq!(body["amount"], json!(4200));
        assert_eq!(body["success_url"], json!("https://shop/ok"));
        assert_eq!(body["cancel_url"], json!("https://shop/cancel"));
        assert!(body.get("customer_email").is_none());
        assert!(body.get("ignored").is_none());

        let expected = Utc::now().timestamp() + 1800;
        let expires_at = body["expires_at"].as_i64().unwrap();
        assert!((expected - expires_at).abs() <= 5);
    }

    #[tokio::test]
    async fn test_checkout_session_caller_expiry() {
        let gw = gateway(MockTransport::new());
        gw.create_checkout_session("gbp", 100, object(json!({"expires_at": 1_900_000_000})))
            .await
            .unwrap();
        assert_eq!(gw.transport().last_body()["expires_at"], json!(1_900_000_000));
    }

    #[tokio::test]
    async fn test_checkout_session_validates() {
        let gw = gateway(MockTransport::new());
        let err = gw
            .create_checkout_session("usd", -10, JsonObject::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCurrency(_)));
        assert!(gw.transport().requests().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Customers
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_customer_whitelists_fields() {
        let gw = gateway(MockTransport::new().respond(200, r#"{"id":"cus_1"}"#));

        gw.create_customer(&object(json!({
            "name": "Jane Doe",
            "email": "  jane@example.com ",
            "phone": "+90 555 000 0000",
            "role": "admin"
        })))
        .await
        .unwrap();

        let req = gw.transport().last_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert!(req.url.ends_with("/customers"));
        assert_eq!(
            gw.transport().last_body(),
            json!({"name": "Jane Doe", "email": "jane@example.com", "phone": "+90 555 000 0000"})
        );
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let gw = gateway(MockTransport::new());

        for email in [json!("not-an-email"), json!(42)] {
            let err = gw
                .create_customer(&object(json!({"name": "X", "email": email})))
                .await
                .unwrap_err();
            assert!(matches!(err, GatewayError::InvalidCredentials(_)));
            assert_eq!(err.to_string(), "Invalid email address");
        }

        let err = gw
            .update_customer("cus_1", &object(json!({"email": "a@@b"})))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCredentials(_)));
        assert!(gw.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_get_customer() {
        let gw = gateway(MockTransport::new());

        gw.update_customer("cus_1", &object(json!({"metadata": {"tier": "gold"}})))
            .await
            .unwrap();
        let req = gw.transport().last_request();
        assert_eq!(req.method, HttpMethod::Put);
        assert!(req.url.ends_with("/customers/cus_1"));
        assert_eq!(gw.transport().last_body(), json!({"metadata": {"tier": "gold"}}));

        gw.get_customer("cus_1").await.unwrap();
        let req = gw.transport().last_request();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.url.ends_with("/customers/cus_1"));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Account
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_validate_credentials_success() {
        let gw = gateway(MockTransport::new().respond(200, r#"{"account_id":"acc_1"}"#));
        let check = gw.validate_api_credentials().await;

        assert!(check.valid);
        assert_eq!(
            check.account_info.unwrap().get("account_id"),
            Some(&json!("acc_1"))
        );
        assert!(gw.transport().last_request().url.ends_with("/account/verify"));
    }

    #[tokio::test]
    async fn test_validate_credentials_never_fails() {
        let gw = gateway(
            MockTransport::new()
                .respond(401, r#"{"message":"bad key"}"#)
                .fail("dns failure")
                .respond(200, "garbage"),
        );

        let check = gw.validate_api_credentials().await;
        assert!(!check.valid);
        assert_eq!(check.error.as_deref(), Some("API Error (401): bad key"));

        let check = gw.validate_api_credentials().await;
        assert_eq!(check.error.as_deref(), Some("Network error: dns failure"));

        let check = gw.validate_api_credentials().await;
        assert_eq!(check.error.as_deref(), Some("Invalid JSON response"));
        assert!(check.account_info.is_none());
    }

    #[tokio::test]
    async fn test_account_passthrough() {
        let gw = gateway(
            MockTransport::new()
                .respond(200, r#"{"name":"Shop"}"#)
                .respond(200, r#"{"available":[{"amount":100,"currency":"USD"}]}"#),
        );

        let info = gw.get_account_info().await.unwrap();
        assert_eq!(info.get("name"), Some(&json!("Shop")));
        assert!(gw.transport().last_request().url.ends_with("/account"));

        let balance = gw.get_balance().await.unwrap();
        assert!(balance.contains_key("available"));
        assert!(gw.transport().last_request().url.ends_with("/balance"));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Test mode
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_test_mode_required() {
        let gw = gateway(MockTransport::new());
        assert!(!gw.is_test_mode());

        let err = gw
            .create_test_payment("USD", 100, "card_declined")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Test mode must be enabled to create test payments"
        );

        let err = gw
            .simulate_webhook("payment.completed", JsonObject::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Test mode must be enabled to simulate webhooks"
        );
        assert!(gw.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_test_mode_operations() {
        let gw = gateway(
            MockTransport::new()
                .respond(200, r#"{"id":"pay_t","status":"failed"}"#)
                .respond(200, r#"{"delivered":true}"#),
        );
        assert!(gw.set_test_mode(true).is_test_mode());

        let payment = gw
            .create_test_payment("usd", 100, "card_declined")
            .await
            .unwrap();
        assert!(payment.is_failed());
        assert!(gw.transport().last_request().url.ends_with("/test/payments"));
        assert_eq!(
            gw.transport().last_body(),
            json!({"currency": "USD", "amount": 100, "scenario": "card_declined", "test_mode": true})
        );

        gw.simulate_webhook("payment.completed", object(json!({"id": "pay_t"})))
            .await
            .unwrap();
        assert!(gw.transport().last_request().url.ends_with("/test/webhooks"));
        assert_eq!(
            gw.transport().last_body(),
            json!({"event_type": "payment.completed", "data": {"id": "pay_t"}, "test_mode": true})
        );

        assert!(!gw.set_test_mode(false).is_test_mode());
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Webhooks
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_webhook_round_trip() {
        let gw = gateway(MockTransport::new());
        let payload = r#"{"type":"payment.completed","data":{"id":"pay_1"}}"#;
        let timestamp = Utc::now().timestamp() - 30;
        let signature = gw.sign_webhook(payload, timestamp);

        assert!(gw.verify_webhook_signature(payload, &signature, Some(timestamp)));
        let event = gw.handle_webhook(payload, &signature, Some(timestamp)).unwrap();
        assert_eq!(event.event_type(), Some("payment.completed"));
    }

    #[test]
    fn test_webhook_signature_checked_before_parsing() {
        let gw = gateway(MockTransport::new());
        let timestamp = Utc::now().timestamp();

        let err = gw
            .handle_webhook("{not json", "bad-signature", Some(timestamp))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid webhook signature");

        let signature = gw.sign_webhook("{not json", timestamp);
        let err = gw
            .handle_webhook("{not json", &signature, Some(timestamp))
            .unwrap_err();
        assert!(matches!(err, GatewayError::PaymentFailed { .. }));
        assert_eq!(err.to_string(), "Invalid webhook payload format");
    }

    #[test]
    fn test_webhook_stale_timestamp_rejected() {
        let gw = gateway(MockTransport::new());
        let payload = r#"{"type":"refund.created"}"#;
        let stale = Utc::now().timestamp() - 3600;
        let signature = gw.sign_webhook(payload, stale);

        assert!(!gw.verify_webhook_signature(payload, &signature, Some(stale)));
        assert!(!gw.verify_webhook_signature("", &signature, Some(stale)));
        assert!(!gw.verify_webhook_signature(payload, "", Some(stale)));
    }

    #[test]
    fn test_webhook_tolerance_from_config() {
        let config = GatewayConfig::new(API_KEY, SECRET).with_webhook_tolerance(10);
        let gw = PaymentGateway::with_transport(config, MockTransport::new()).unwrap();
        let payload = r#"{"type":"x"}"#;
        let ts = Utc::now().timestamp() - 60;

        assert!(!gw.verify_webhook_signature(payload, &gw.sign_webhook(payload, ts), Some(ts)));
    }
}
