//! Paygate CLI
//!
//! Command-line interface for the payment gateway API. Credentials and
//! settings are read from `PAYGATE_*` environment variables (or a `.env`
//! file).

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paygate_client::{GatewayConfig, PaymentGateway, format_amount};
use paygate_types::JsonObject;

#[derive(Parser)]
#[command(name = "paygate")]
#[command(author, version, about = "Payment gateway API CLI client", long_about = None)]
struct Cli {
    /// Override the gateway base URL
    #[arg(long, env = "PAYGATE_BASE_URL")]
    base_url: Option<String>,

    /// Enable test-mode operations
    #[arg(long)]
    test_mode: bool,

    /// Log every request
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Payment operations
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Refund a payment
    Refund {
        payment_id: String,
        /// Partial amount in minor units (full refund when omitted)
        #[arg(long)]
        amount: Option<i64>,
        /// Metadata entries as key=value
        #[arg(long = "meta")]
        metadata: Vec<String>,
    },
    /// Create a hosted checkout session
    Checkout {
        /// Amount in minor units
        amount: i64,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        success_url: Option<String>,
        #[arg(long)]
        cancel_url: Option<String>,
        #[arg(long)]
        customer_email: Option<String>,
    },
    /// Customer operations
    Customer {
        #[command(subcommand)]
        action: CustomerCommands,
    },
    /// Account operations
    Account {
        #[command(subcommand)]
        action: AccountCommands,
    },
    /// Webhook tools
    Webhook {
        #[command(subcommand)]
        action: WebhookCommands,
    },
    /// Test-mode operations (requires --test-mode)
    Test {
        #[command(subcommand)]
        action: TestCommands,
    },
    /// Format an amount in minor units for display
    Format {
        amount: i64,
        #[arg(default_value = "USD")]
        currency: String,
    },
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Charge an amount
    Charge {
        /// Amount in minor units
        amount: i64,
        /// Currency code (defaults to PAYGATE_DEFAULT_CURRENCY)
        #[arg(long)]
        currency: Option<String>,
        /// Metadata entries as key=value
        #[arg(long = "meta")]
        metadata: Vec<String>,
    },
    /// Create an unconfirmed payment intent
    Intent {
        amount: i64,
        #[arg(long)]
        currency: Option<String>,
    },
    /// Get payment details
    Get { id: String },
    /// Cancel a payment
    Cancel {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Capture an authorized payment
    Capture {
        id: String,
        #[arg(long)]
        amount: Option<i64>,
    },
    /// List payments
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        page: Option<i64>,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// List payments between two dates (YYYY-MM-DD)
    Range {
        start: NaiveDate,
        end: NaiveDate,
        #[arg(long)]
        status: Option<String>,
    },
    /// Aggregate payment statistics
    Stats {
        #[arg(long)]
        group_by: Option<String>,
        #[arg(long)]
        currency: Option<String>,
    },
}

#[derive(Subcommand)]
enum CustomerCommands {
    /// Create a customer
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Get customer details
    Get { id: String },
    /// List customers
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<i64>,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// List a customer's payments
    Payments { id: String },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Check that the configured credentials are accepted
    Verify,
    /// Show account details
    Info,
    /// Show account balance
    Balance,
}

#[derive(Subcommand)]
enum WebhookCommands {
    /// Verify a webhook payload read from a file
    Verify {
        /// File containing the raw request body
        #[arg(long)]
        payload: PathBuf,
        #[arg(long)]
        signature: String,
        #[arg(long)]
        timestamp: Option<i64>,
    },
    /// Sign a payload the way the gateway does
    Sign {
        #[arg(long)]
        payload: PathBuf,
        #[arg(long)]
        timestamp: i64,
    },
}

#[derive(Subcommand)]
enum TestCommands {
    /// Create a payment that plays out a scenario
    Payment {
        amount: i64,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long, default_value = "success")]
        scenario: String,
    },
    /// Ask the gateway to deliver a synthetic webhook
    Webhook {
        event_type: String,
        /// Event data entries as key=value
        #[arg(long = "data")]
        data: Vec<String>,
    },
}

/// Parses `key=value` entries into a JSON object of strings.
fn parse_pairs(entries: &[String]) -> Result<JsonObject> {
    entries
        .iter()
        .map(|entry| {
            let (key, value) = entry
                .split_once('=')
                .with_context(|| format!("Expected key=value, got: {}", entry))?;
            Ok((key.to_string(), Value::String(value.to_string())))
        })
        .collect()
}

/// Builds a filter object from optional CLI flags.
fn filters<const N: usize>(pairs: [(&str, Option<Value>); N]) -> JsonObject {
    pairs
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
        .collect()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing(enabled: bool) {
    let default_filter = if enabled {
        "info,paygate=debug,paygate_client=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_gateway(cli: &Cli) -> Result<PaymentGateway> {
    let mut config = GatewayConfig::from_env()?;
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    if cli.verbose {
        config.log_requests = true;
    }
    init_tracing(config.log_requests);
    tracing::debug!(base_url = %config.base_url, test_mode = cli.test_mode, "gateway configured");

    let gateway = PaymentGateway::from_config(config)?;
    gateway.set_test_mode(cli.test_mode);
    Ok(gateway)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::Format { amount, currency } = &cli.command {
        println!("{}", format_amount(*amount, currency));
        return Ok(());
    }

    let gateway = build_gateway(&cli)?;
    let currency_or_default = |currency: &Option<String>| {
        currency
            .clone()
            .unwrap_or_else(|| gateway.default_currency().to_string())
    };

    match &cli.command {
        Commands::Payment { action } => match action {
            PaymentCommands::Charge {
                amount,
                currency,
                metadata,
            } => {
                let payment = gateway
                    .charge(&currency_or_default(currency), *amount, parse_pairs(metadata)?)
                    .await?;
                print_json(&payment)?;
            }
            PaymentCommands::Intent { amount, currency } => {
                let intent = gateway
                    .create_payment_intent(&currency_or_default(currency), *amount, JsonObject::new())
                    .await?;
                print_json(&intent)?;
            }
            PaymentCommands::Get { id } => print_json(&gateway.get_payment(id).await?)?,
            PaymentCommands::Cancel { id, reason } => {
                let options = filters([("reason", reason.clone().map(Value::from))]);
                print_json(&gateway.cancel_payment(id, options).await?)?;
            }
            PaymentCommands::Capture { id, amount } => {
                print_json(&gateway.capture_payment(id, *amount).await?)?;
            }
            PaymentCommands::List {
                status,
                currency,
                page,
                limit,
            } => {
                let filters = filters([
                    ("status", status.clone().map(Value::from)),
                    ("currency", currency.clone().map(Value::from)),
                    ("page", page.map(Value::from)),
                    ("limit", limit.map(Value::from)),
                ]);
                print_json(&gateway.list_payments(&filters).await?)?;
            }
            PaymentCommands::Range { start, end, status } => {
                let options = filters([("status", status.clone().map(Value::from))]);
                print_json(
                    &gateway
                        .get_payments_by_date_range(*start, *end, &options)
                        .await?,
                )?;
            }
            PaymentCommands::Stats { group_by, currency } => {
                let filters = filters([
                    ("group_by", group_by.clone().map(Value::from)),
                    ("currency", currency.clone().map(Value::from)),
                ]);
                print_json(&gateway.get_payment_statistics(&filters).await?)?;
            }
        },

        Commands::Refund {
            payment_id,
            amount,
            metadata,
        } => {
            let refund = gateway
                .refund(payment_id, *amount, parse_pairs(metadata)?)
                .await?;
            print_json(&refund)?;
        }

        Commands::Checkout {
            amount,
            currency,
            success_url,
            cancel_url,
            customer_email,
        } => {
            let options = filters([
                ("success_url", success_url.clone().map(Value::from)),
                ("cancel_url", cancel_url.clone().map(Value::from)),
                ("customer_email", customer_email.clone().map(Value::from)),
            ]);
            let session = gateway
                .create_checkout_session(&currency_or_default(currency), *amount, options)
                .await?;
            print_json(&session)?;
        }

        Commands::Customer { action } => match action {
            CustomerCommands::Create { name, email, phone } => {
                let data = filters([
                    ("name", name.clone().map(Value::from)),
                    ("email", email.clone().map(Value::from)),
                    ("phone", phone.clone().map(Value::from)),
                ]);
                print_json(&gateway.create_customer(&data).await?)?;
            }
            CustomerCommands::Get { id } => print_json(&gateway.get_customer(id).await?)?,
            CustomerCommands::List {
                search,
                page,
                limit,
            } => {
                let filters = filters([
                    ("search", search.clone().map(Value::from)),
                    ("page", page.map(Value::from)),
                    ("limit", limit.map(Value::from)),
                ]);
                print_json(&gateway.list_customers(&filters).await?)?;
            }
            CustomerCommands::Payments { id } => {
                print_json(
                    &gateway
                        .get_customer_payments(id, &JsonObject::new())
                        .await?,
                )?;
            }
        },

        Commands::Account { action } => match action {
            AccountCommands::Verify => {
                let check = gateway.validate_api_credentials().await;
                print_json(&check)?;
                if !check.valid {
                    std::process::exit(1);
                }
            }
            AccountCommands::Info => print_json(&gateway.get_account_info().await?)?,
            AccountCommands::Balance => print_json(&gateway.get_balance().await?)?,
        },

        Commands::Webhook { action } => match action {
            WebhookCommands::Verify {
                payload,
                signature,
                timestamp,
            } => {
                let body = std::fs::read_to_string(payload)
                    .with_context(|| format!("Failed to read {}", payload.display()))?;
                let event = gateway.handle_webhook(&body, signature, *timestamp)?;
                print_json(&event)?;
            }
            WebhookCommands::Sign { payload, timestamp } => {
                let body = std::fs::read_to_string(payload)
                    .with_context(|| format!("Failed to read {}", payload.display()))?;
                println!("{}", gateway.sign_webhook(&body, *timestamp));
            }
        },

        Commands::Test { action } => match action {
            TestCommands::Payment {
                amount,
                currency,
                scenario,
            } => {
                let payment = gateway
                    .create_test_payment(&currency_or_default(currency), *amount, scenario)
                    .await?;
                print_json(&payment)?;
            }
            TestCommands::Webhook { event_type, data } => {
                let result = gateway
                    .simulate_webhook(event_type, parse_pairs(data)?)
                    .await?;
                print_json(&result)?;
            }
        },

        Commands::Format { .. } => unreachable!("handled before building the gateway"),
    }

    Ok(())
}
