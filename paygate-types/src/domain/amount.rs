//! Amount conversion and display helpers.
//!
//! Amounts travel as integers in minor units (cents, whole yen). These
//! helpers convert to and from major units and render human-readable
//! strings.

use super::currency::Currency;

/// Renders `amount_minor` with its currency symbol, e.g. `$29.99` or `¥1,000`.
///
/// Unknown currencies use their uppercased code as the symbol. JPY renders
/// without decimals; every other currency renders two decimal places.
pub fn format_amount(amount_minor: i64, currency: &str) -> String {
    let code = currency.to_uppercase();
    let symbol = code
        .parse::<Currency>()
        .ok()
        .and_then(|c| c.symbol())
        .map(str::to_string)
        .unwrap_or_else(|| code.clone());
    let decimals = if code == "JPY" { 0 } else { 2 };

    format!("{}{}", symbol, group_decimal(amount_minor, decimals))
}

/// Converts a major-unit amount to minor units, rounding half away from zero.
///
/// Rounding is applied to the shortest decimal representation of `amount`,
/// so `to_cents(0.995)` is `100` even though `0.995 * 100.0` is slightly
/// below `99.5` in binary floating point.
pub fn to_cents(amount: f64) -> i64 {
    if !amount.is_finite() {
        return (amount * 100.0) as i64;
    }

    let repr = amount.abs().to_string();
    let (whole, fraction) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    let Ok(whole) = whole.parse::<i64>() else {
        // Saturating cast for magnitudes beyond i64 range.
        return (amount * 100.0) as i64;
    };

    let mut digits = fraction.bytes().map(|b| i64::from(b - b'0'));
    let tenths = digits.next().unwrap_or(0);
    let hundredths = digits.next().unwrap_or(0);
    let round_up = digits.next().is_some_and(|d| d >= 5);

    let cents = whole
        .saturating_mul(100)
        .saturating_add(tenths * 10 + hundredths + i64::from(round_up));

    if amount.is_sign_negative() {
        -cents
    } else {
        cents
    }
}

/// Converts minor units to a major-unit floating point value.
pub fn from_cents(amount_minor: i64) -> f64 {
    amount_minor as f64 / 100.0
}

/// Formats `amount_minor` as a decimal with `decimals` places and comma
/// thousands separators, e.g. `123456` with 2 decimals is `1,234.56`.
pub(crate) fn group_decimal(amount_minor: i64, decimals: u32) -> String {
    let divisor = 10_u64.pow(decimals);
    let abs = amount_minor.unsigned_abs();
    let major = (abs / divisor).to_string();
    let minor = abs % divisor;

    let mut out = String::with_capacity(major.len() + major.len() / 3 + 4);
    if amount_minor < 0 {
        out.push('-');
    }
    for (i, ch) in major.chars().enumerate() {
        if i > 0 && (major.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if decimals > 0 {
        out.push_str(&format!(".{:0width$}", minor, width = decimals as usize));
    }
    out
}
