//! Common arithmetic helpers for the margin calculations.
//!
//! Currency values are never rounded while computing; these helpers only
//! make the arithmetic total (no panics on a zero denominator or overflow)
//! and provide the half-up rounding used for display.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to `dp` decimal places using half-up rounding.
///
/// Values exactly at the midpoint are rounded away from zero, matching how
/// currency amounts are displayed to the user.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use margin_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.455), 2), dec!(123.46));
/// assert_eq!(round_half_up(dec!(51.25), 1), dec!(51.3));
/// assert_eq!(round_half_up(dec!(-123.455), 2), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Divides `numerator` by `denominator`, substituting zero when the
/// denominator is not positive or the quotient does not fit.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use margin_core::calculations::common::ratio;
///
/// assert_eq!(ratio(dec!(3000), dec!(160)), dec!(18.75));
/// assert_eq!(ratio(dec!(3000), Decimal::ZERO), Decimal::ZERO);
/// ```
pub fn ratio(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// Expresses `rate` (a percentage such as `12.5`) of `base`.
pub fn percent_of(
    rate: Decimal,
    base: Decimal,
) -> Decimal {
    (rate / Decimal::ONE_HUNDRED).saturating_mul(base)
}

/// Returns the maximum of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454), 2);

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(123.455), 2);

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-0.05), 1);

        assert_eq!(result, dec!(-0.1)); // Away from zero
    }

    #[test]
    fn round_half_up_to_whole_units() {
        let result = round_half_up(dec!(33.5), 0);

        assert_eq!(result, dec!(34));
    }

    // =========================================================================
    // ratio tests
    // =========================================================================

    #[test]
    fn ratio_divides_exactly() {
        let result = ratio(dec!(102.5), dec!(200));

        assert_eq!(result, dec!(0.5125));
    }

    #[test]
    fn ratio_zero_denominator_is_zero() {
        let result = ratio(dec!(100), Decimal::ZERO);

        assert_eq!(result, Decimal::ZERO);
    }

    #[test]
    fn ratio_negative_denominator_is_zero() {
        let result = ratio(dec!(100), dec!(-4));

        assert_eq!(result, Decimal::ZERO);
    }

    #[test]
    fn ratio_overflow_is_zero() {
        let result = ratio(Decimal::MAX, dec!(0.0000001));

        assert_eq!(result, Decimal::ZERO);
    }

    // =========================================================================
    // percent_of tests
    // =========================================================================

    #[test]
    fn percent_of_takes_share_of_base() {
        assert_eq!(percent_of(dec!(10), dec!(200)), dec!(20));
        assert_eq!(percent_of(dec!(12.5), dec!(80)), dec!(10));
    }

    #[test]
    fn percent_of_zero_rate_is_zero() {
        assert_eq!(percent_of(Decimal::ZERO, dec!(200)), Decimal::ZERO);
    }

    // =========================================================================
    // max tests
    // =========================================================================

    #[test]
    fn max_returns_larger_value() {
        assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
        assert_eq!(max(dec!(200.00), dec!(100.00)), dec!(200.00));
    }

    #[test]
    fn max_floors_negative_at_zero() {
        assert_eq!(max(dec!(-50.00), Decimal::ZERO), Decimal::ZERO);
    }
}
