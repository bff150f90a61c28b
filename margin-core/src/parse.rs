//! Parsers for the localized (pt-BR) numeric text typed into the audit form.
//!
//! Users type money as `1.234,56`, `1234,56` or `1234`; these helpers turn
//! that text into [`Decimal`] values without ever failing loudly. Anything
//! that cannot be read as a number becomes `None`, which the wizards treat
//! as "field not filled in yet".

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static NON_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D+").expect("static regex"));

static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\d,.\-]").expect("static regex"));

/// Removes every character that is not an ASCII digit.
pub fn only_digits(s: &str) -> String {
    NON_DIGITS.replace_all(s, "").into_owned()
}

/// Normalizes localized numeric text into the `1234.56` form [`Decimal`] parses.
///
/// Keeps digits, `,`, `.` and `-`. When both separators appear the dot is a
/// thousands separator and the (first) comma is the decimal point; a lone
/// comma is the decimal point.
fn normalize_localized(s: &str) -> String {
    let kept = NON_NUMERIC.replace_all(s.trim(), "").into_owned();

    if kept.contains(',') && kept.contains('.') {
        kept.replace('.', "").replacen(',', ".", 1)
    } else if kept.contains(',') {
        kept.replacen(',', ".", 1)
    } else {
        kept
    }
}

/// Parses localized numeric text (comma decimal, dot thousands).
///
/// Returns `None` for empty input or when the cleaned text is not a number
/// (e.g. `"1,2,3"`, `"-"`, or more digits than a [`Decimal`] can hold).
/// A leading minus sign is preserved so callers can decide what a negative
/// value means for their field.
///
/// ```
/// use rust_decimal_macros::dec;
/// use margin_core::parse::parse_localized_number;
///
/// assert_eq!(parse_localized_number("R$ 1.234,56"), Some(dec!(1234.56)));
/// assert_eq!(parse_localized_number("12,5"), Some(dec!(12.5)));
/// assert_eq!(parse_localized_number("abc"), None);
/// ```
pub fn parse_localized_number(s: &str) -> Option<Decimal> {
    let normalized = normalize_localized(s);
    if normalized.is_empty() {
        return None;
    }

    match normalized.parse::<Decimal>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(input = %s, "unparseable localized number: {}", e);
            None
        }
    }
}

/// Parses an integer by discarding every non-digit character.
///
/// `"90 min"` reads as 90. Returns `None` when no digits remain or the value
/// does not fit in a `u32`.
pub fn parse_integer(s: &str) -> Option<u32> {
    let digits = only_digits(s);
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Clamps `value` into `[min, max]`, passing `None` through.
pub fn clamp(
    value: Option<Decimal>,
    min: Decimal,
    max: Decimal,
) -> Option<Decimal> {
    value.map(|v| v.max(min).min(max))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn localized_number_treats_dot_as_thousands_when_both_present() {
        assert_eq!(parse_localized_number("1.234,56"), Some(dec!(1234.56)));
        assert_eq!(parse_localized_number("1.234.567,8"), Some(dec!(1234567.8)));
    }

    #[test]
    fn localized_number_treats_lone_comma_as_decimal() {
        assert_eq!(parse_localized_number("3000,50"), Some(dec!(3000.50)));
    }

    #[test]
    fn localized_number_accepts_plain_dot_decimal() {
        assert_eq!(parse_localized_number("18.75"), Some(dec!(18.75)));
    }

    #[test]
    fn localized_number_strips_currency_and_spaces() {
        assert_eq!(parse_localized_number("  R$ 3.000,00 "), Some(dec!(3000)));
    }

    #[test]
    fn localized_number_empty_or_garbage_is_none() {
        assert_eq!(parse_localized_number(""), None);
        assert_eq!(parse_localized_number("   "), None);
        assert_eq!(parse_localized_number("abc"), None);
        assert_eq!(parse_localized_number("-"), None);
    }

    #[test]
    fn localized_number_rejects_ambiguous_separators() {
        assert_eq!(parse_localized_number("1,2,3"), None);
        assert_eq!(parse_localized_number("1.234.567"), None);
    }

    #[test]
    fn localized_number_keeps_leading_minus() {
        assert_eq!(parse_localized_number("-10,5"), Some(dec!(-10.5)));
    }

    #[test]
    fn integer_strips_non_digits() {
        assert_eq!(parse_integer("90 min"), Some(90));
        assert_eq!(parse_integer("1.200"), Some(1200));
        assert_eq!(parse_integer("-5"), Some(5));
    }

    #[test]
    fn integer_empty_is_none() {
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer("min"), None);
    }

    #[test]
    fn integer_overflow_is_none() {
        assert_eq!(parse_integer("99999999999999"), None);
    }

    #[test]
    fn clamp_bounds_value() {
        assert_eq!(clamp(Some(dec!(150)), dec!(0), dec!(100)), Some(dec!(100)));
        assert_eq!(clamp(Some(dec!(-1)), dec!(0), dec!(100)), Some(dec!(0)));
        assert_eq!(clamp(Some(dec!(12.5)), dec!(0), dec!(100)), Some(dec!(12.5)));
    }

    #[test]
    fn clamp_passes_none_through() {
        assert_eq!(clamp(None, dec!(0), dec!(100)), None);
    }
}
