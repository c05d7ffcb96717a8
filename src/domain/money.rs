//! Decimal parsing and display rounding shared by the watchlist and trade log.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Decimal places used when displaying monetary values.
pub const MONEY_DP: u32 = 2;

/// Lenient decimal parse for spreadsheet-edited cells.
///
/// Blank cells, `nan`, and anything non-numeric yield `None`. A leading `$`
/// and `,` thousands separators are accepted.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }

    let cleaned: String = trimmed
        .strip_prefix('$')
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| *c != ',')
        .collect();

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Round a monetary value for display.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Cents-rounded money text, e.g. `1234.50`.
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

/// Like [`format_money`], with `-` for an unknown value.
pub fn format_optional_money(value: Option<Decimal>) -> String {
    value.map(format_money).unwrap_or_else(|| "-".to_string())
}

/// Quantity without trailing zeros, e.g. `10` or `2.5`.
pub fn format_quantity(value: Decimal) -> String {
    value.normalize().to_string()
}
