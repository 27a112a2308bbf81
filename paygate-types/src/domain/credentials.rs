//! Gateway API credentials.

use std::fmt;

use crate::error::GatewayError;

const MIN_CREDENTIAL_LEN: usize = 10;

/// API key and secret key pair, validated once at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    secret_key: String,
}

impl Credentials {
    /// Validates and wraps a credential pair.
    ///
    /// Both values must be non-blank and at least 10 characters long.
    pub fn new(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let api_key = api_key.into();
        let secret_key = secret_key.into();

        if api_key.trim().is_empty() || secret_key.trim().is_empty() {
            return Err(GatewayError::InvalidCredentials(
                "API key and secret key are required".into(),
            ));
        }

        if api_key.chars().count() < MIN_CREDENTIAL_LEN
            || secret_key.chars().count() < MIN_CREDENTIAL_LEN
        {
            return Err(GatewayError::InvalidCredentials(
                "API key and secret key must be at least 10 characters long".into(),
            ));
        }

        Ok(Self {
            api_key,
            secret_key,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The signing secret. Never log this value.
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
