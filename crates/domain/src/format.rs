//! Display formatting for amounts. Rounding happens here and nowhere in the pricing path.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency codes rendered with a dollar sign.
const DOLLAR_CODES: [&str; 4] = ["USD", "USDT", "USDC", "USDB"];

/// Formats an amount with two decimals and comma grouping, e.g. `1,234.50`.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// Formats an amount in a currency: `$1,234.50` for dollar-like codes,
/// `NGN 1,234.50` otherwise.
pub fn format_currency(value: Decimal, currency: &str) -> String {
    let body = format_amount(value.abs());
    let sign = if value.round_dp(2) < Decimal::ZERO { "-" } else { "" };
    if DOLLAR_CODES.contains(&currency.to_ascii_uppercase().as_str()) {
        format!("{sign}${body}")
    } else {
        format!("{sign}{currency} {body}")
    }
}
