//! Currency formatting for displayed balances.

use bigdecimal::{BigDecimal, FromPrimitive, Zero};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Formats `amount` as `$1,234.56`, rounding half-up to two decimals.
pub fn format_currency(amount: &BigDecimal) -> String {
    format_currency_with(DEFAULT_CURRENCY_SYMBOL, amount)
}

pub fn format_currency_with(symbol: &str, amount: &BigDecimal) -> String {
    let rounded = amount.round(2).with_scale(2);
    let sign = if rounded < BigDecimal::zero() { "-" } else { "" };

    let digits = rounded.abs().to_string();
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole.to_string(), fraction.to_string()),
        None => (digits, "00".to_string()),
    };

    format!("{}{}{}.{}", sign, symbol, group_thousands(&whole), fraction)
}

/// Float entry point for presentation callers. Non-finite input renders as zero
/// and is reported through a warning.
pub fn format_currency_f64(value: f64) -> String {
    if !value.is_finite() {
        tracing::warn!(value = %value, "non-finite amount passed to currency formatter");
        return format_currency(&BigDecimal::zero());
    }

    let amount = BigDecimal::from_f64(value).unwrap_or_else(BigDecimal::zero);
    format_currency(&amount)
}

fn group_thousands(whole: &str) -> String {
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
