//! Client configuration, loadable from environment variables.

use std::env;
use std::fmt;
use std::time::Duration;

use paygate_types::{Currency, GatewayError};

use crate::signing::DEFAULT_BASE_URL;
use crate::transport::DEFAULT_TIMEOUT;
use crate::webhook::DEFAULT_TOLERANCE_SECS;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Gateway client configuration.
#[derive(Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub secret_key: String,
    pub base_url: String,
    pub default_currency: Currency,
    pub webhook_tolerance_secs: u64,
    pub timeout: Duration,
    pub log_requests: bool,
}

impl GatewayConfig {
    /// Creates a configuration with default settings for the given credentials.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_currency: Currency::USD,
            webhook_tolerance_secs: DEFAULT_TOLERANCE_SECS,
            timeout: DEFAULT_TIMEOUT,
            log_requests: false,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_currency(mut self, currency: Currency) -> Self {
        self.default_currency = currency;
        self
    }

    pub fn with_webhook_tolerance(mut self, secs: u64) -> Self {
        self.webhook_tolerance_secs = secs;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    /// Loads configuration from `PAYGATE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("PAYGATE_API_KEY").ok_or(ConfigError::Missing("PAYGATE_API_KEY"))?;
        let secret_key =
            lookup("PAYGATE_SECRET_KEY").ok_or(ConfigError::Missing("PAYGATE_SECRET_KEY"))?;

        let mut config = Self::new(api_key, secret_key);

        if let Some(base_url) = lookup("PAYGATE_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(code) = lookup("PAYGATE_DEFAULT_CURRENCY") {
            config.default_currency = code.parse()?;
        }
        if let Some(value) = lookup("PAYGATE_WEBHOOK_TOLERANCE") {
            config.webhook_tolerance_secs = parse_number("PAYGATE_WEBHOOK_TOLERANCE", value)?;
        }
        if let Some(value) = lookup("PAYGATE_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_number("PAYGATE_TIMEOUT_SECS", value)?);
        }
        if let Some(value) = lookup("PAYGATE_LOGGING") {
            config.log_requests = parse_flag("PAYGATE_LOGGING", value)?;
        }

        Ok(config)
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_currency", &self.default_currency)
            .field("webhook_tolerance_secs", &self.webhook_tolerance_secs)
            .field("timeout", &self.timeout)
            .field("log_requests", &self.log_requests)
            .finish()
    }
}

fn parse_number(name: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}
