//! Shared helpers for the engine's calculations.
//!
//! Anything that divides by a caller-controlled value goes through
//! [`ratio`], [`percent_of`] or [`months_to_cover`], which report an
//! undefined result as `None` instead of failing.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Months in a year, as a decimal.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use property_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Converts a whole-number annual percentage into a monthly fraction.
///
/// ```
/// use rust_decimal_macros::dec;
/// use property_core::calculations::common::monthly_rate;
///
/// assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
/// ```
pub fn monthly_rate(annual_pct: Decimal) -> Decimal {
    annual_pct / Decimal::ONE_HUNDRED / MONTHS_PER_YEAR
}

/// `numerator / denominator`, or `None` when the denominator is zero.
pub fn ratio(
    numerator: Decimal,
    denominator: Decimal,
) -> Option<Decimal> {
    numerator.checked_div(denominator)
}

/// `part` as a percentage of `whole`, or `None` when `whole` is zero.
pub fn percent_of(
    part: Decimal,
    whole: Decimal,
) -> Option<Decimal> {
    ratio(part, whole).and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
}

/// Whole months needed to cover `remaining` at `per_month`.
///
/// Nothing remaining is zero months. A non-positive monthly amount never
/// covers a positive remainder, which is reported as `None`.
pub fn months_to_cover(
    remaining: Decimal,
    per_month: Decimal,
) -> Option<u32> {
    if remaining <= Decimal::ZERO {
        return Some(0);
    }
    if per_month <= Decimal::ZERO {
        return None;
    }
    ratio(remaining, per_month)?.ceil().to_u32()
}
