//! Presentation helpers: money, percentages, months and dates.

use chrono::{Months, NaiveDate};
use property_core::calculations::common::round_half_up;
use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas,
/// spaces and a leading `R`.
fn normalize_decimal_input(s: &str) -> String {
    let trimmed = s.trim();
    trimmed
        .strip_prefix('R')
        .unwrap_or(trimmed)
        .replace([',', ' '], "")
}

/// Parses a string into a [`Decimal`].
///
/// Accepts thousands separators and a currency prefix (e.g. `"R1,234.56"`).
/// Empty input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// `R` prefix, comma thousands grouping, two decimals rounded half-up.
///
/// ```
/// use rust_decimal_macros::dec;
/// use property_cli::format::format_money;
///
/// assert_eq!(format_money(dec!(1234567.895)), "R1,234,567.90");
/// assert_eq!(format_money(dec!(-950)), "-R950.00");
/// ```
pub fn format_money(amount: Decimal) -> String {
    let rounded = round_half_up(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}R{}.{fraction}", group_thousands(whole))
}

/// Exactly one decimal and a trailing `%`.
pub fn format_percentage(value: Decimal) -> String {
    let rounded =
        value.round_dp_with_strategy(1, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.1}%")
}

/// Undefined quotients render as "—".
pub fn format_optional_percentage(value: Option<Decimal>) -> String {
    value
        .map(format_percentage)
        .unwrap_or_else(|| "—".to_string())
}

/// `"34 months (2 yr 10 mo)"`, or "not reached" for `None`.
pub fn format_months(months: Option<u32>) -> String {
    match months {
        None => "not reached".to_string(),
        Some(m) if m < 12 => format!("{m} months"),
        Some(m) => format!("{m} months ({} yr {} mo)", m / 12, m % 12),
    }
}

/// Calendar month in which `months` from `today` falls.
pub fn projected_date(
    today: NaiveDate,
    months: u32,
) -> Option<NaiveDate> {
    today.checked_add_months(Months::new(months))
}

/// `"March 2029"`, or "—" when no date can be projected.
pub fn format_projected_date(
    today: NaiveDate,
    months: Option<u32>,
) -> String {
    months
        .and_then(|m| projected_date(today, m))
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| "—".to_string())
}
