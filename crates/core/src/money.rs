//! Money parsing and the comma-decimal display format used on receipts and reports.

use rust_decimal::{Decimal, RoundingStrategy};

/// Parses a price as written in article lists (`"3,50"`, `"3.50"`, `"12"`).
///
/// Returns `None` for anything that is not a plain decimal number.
pub fn parse_price(input: &str) -> Option<Decimal> {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<Decimal>().ok()
}

/// Formats an amount with two decimals and a comma separator (`8,50`).
pub fn format_money(amount: Decimal) -> String {
    format_decimal(amount, 2)
}

/// Formats a value with `places` decimals and a comma separator.
pub fn format_decimal(value: Decimal, places: u32) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", places as usize, rounded);
    text.replace('.', ",")
}
