//! Supported currencies and validated monetary amounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::amount::{format_amount, group_decimal};
use crate::error::GatewayError;

/// Largest accepted amount in minor units (999,999.99 in major units).
pub const MAX_AMOUNT: i64 = 99_999_999;

/// ISO 4217 currencies accepted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    USD,
    EUR,
    GBP,
    TRY,
    CAD,
    AUD,
    JPY,
    CHF,
    SEK,
    NOK,
    DKK,
    PLN,
    CZK,
    HUF,
    RON,
    BGN,
}

impl Currency {
    /// Every supported currency, in table order.
    pub const ALL: [Currency; 16] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::TRY,
        Currency::CAD,
        Currency::AUD,
        Currency::JPY,
        Currency::CHF,
        Currency::SEK,
        Currency::NOK,
        Currency::DKK,
        Currency::PLN,
        Currency::CZK,
        Currency::HUF,
        Currency::RON,
        Currency::BGN,
    ];

    /// Returns the three-letter uppercase code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::TRY => "TRY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
            Currency::SEK => "SEK",
            Currency::NOK => "NOK",
            Currency::DKK => "DKK",
            Currency::PLN => "PLN",
            Currency::CZK => "CZK",
            Currency::HUF => "HUF",
            Currency::RON => "RON",
            Currency::BGN => "BGN",
        }
    }

    /// Returns the number of decimal places for this currency.
    pub fn minor_units(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Returns the display symbol, if this currency has one.
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Currency::USD => Some("$"),
            Currency::EUR => Some("€"),
            Currency::GBP => Some("£"),
            Currency::TRY => Some("₺"),
            Currency::JPY => Some("¥"),
            Currency::CAD => Some("C$"),
            Currency::AUD => Some("A$"),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .iter()
            .find(|c| c.code().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| {
                GatewayError::InvalidCurrency(format!(
                    "Unsupported currency: {}. Supported currencies: {}",
                    s.to_uppercase(),
                    supported_codes().join(", ")
                ))
            })
    }
}

/// Case-insensitive membership test against the supported table.
pub fn is_supported(code: &str) -> bool {
    code.parse::<Currency>().is_ok()
}

/// Decimal places for `code`. Zero-decimal currencies return 0; anything
/// else, supported or not, returns 2.
pub fn minor_units(code: &str) -> u32 {
    if code.eq_ignore_ascii_case("JPY") || code.eq_ignore_ascii_case("KRW") {
        0
    } else {
        2
    }
}

/// Formats minor units with the currency's decimal places followed by the
/// uppercased code, e.g. `1,234.56 USD`.
pub fn format(amount_minor: i64, code: &str) -> String {
    format!(
        "{} {}",
        group_decimal(amount_minor, minor_units(code)),
        code.to_uppercase()
    )
}

/// Codes of all supported currencies.
pub fn supported_codes() -> Vec<&'static str> {
    Currency::ALL.iter().map(Currency::code).collect()
}

/// Checks that an amount in minor units is within the accepted range.
pub fn validate_amount(amount: i64) -> Result<(), GatewayError> {
    if amount <= 0 {
        return Err(GatewayError::InvalidCurrency(
            "Amount must be greater than zero".into(),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(GatewayError::InvalidCurrency(
            "Amount exceeds maximum allowed limit".into(),
        ));
    }
    Ok(())
}

/// A validated amount in minor units with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value, rejecting out-of-range amounts.
    pub fn new(amount: i64, currency: Currency) -> Result<Self, GatewayError> {
        validate_amount(amount)?;
        Ok(Self { amount, currency })
    }

    /// Validates a currency code and amount coming from a caller.
    pub fn parse(code: &str, amount: i64) -> Result<Self, GatewayError> {
        let currency = code.parse()?;
        Self::new(amount, currency)
    }

    /// Returns the amount in minor units.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Returns the currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_amount(self.amount, self.currency.code()))
    }
}
