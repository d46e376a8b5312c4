//! # Channel-Specific Amount Formatting
//!
//! Each output channel formats money its own way and the two must not be
//! merged:
//!
//! | Channel | Function | 1234.5 renders as |
//! |---------|----------|-------------------|
//! | Thermal ticket | [`fixed_2dp`] | `1234.50` |
//! | On-screen preview | [`grouped`] | `1,234.50` |
//!
//! Printer firmware does not render digit grouping reliably, so the ticket
//! never carries separators.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round half away from zero to exactly two decimal places.
fn to_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Fixed two-decimal representation for the thermal ticket.
///
/// ```
/// use recibo::format::fixed_2dp;
/// use rust_decimal::Decimal;
///
/// assert_eq!(fixed_2dp(Decimal::new(15, 0)), "15.00");
/// assert_eq!(fixed_2dp(Decimal::new(123456789, 2)), "1234567.89");
/// ```
pub fn fixed_2dp(amount: Decimal) -> String {
    to_cents(amount).to_string()
}

/// es-PE style grouping (`,` thousands, `.` decimals) for the preview.
///
/// ```
/// use recibo::format::grouped;
/// use rust_decimal::Decimal;
///
/// assert_eq!(grouped(Decimal::new(123456789, 2)), "1,234,567.89");
/// ```
pub fn grouped(amount: Decimal) -> String {
    let plain = fixed_2dp(amount);
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut out = String::with_capacity(plain.len() + int_part.len() / 3);
    out.push_str(sign);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push('.');
    out.push_str(frac_part);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_2dp_pads_and_rounds() {
        assert_eq!(fixed_2dp(Decimal::ZERO), "0.00");
        assert_eq!(fixed_2dp(Decimal::new(5, 1)), "0.50");
        assert_eq!(fixed_2dp(Decimal::new(12345, 3)), "12.35");
        assert_eq!(fixed_2dp(Decimal::new(100000000, 2)), "1000000.00");
    }

    #[test]
    fn test_grouped_thousands() {
        assert_eq!(grouped(Decimal::new(999, 0)), "999.00");
        assert_eq!(grouped(Decimal::new(1000, 0)), "1,000.00");
        assert_eq!(grouped(Decimal::new(1234567, 1)), "123,456.70");
        assert_eq!(grouped(Decimal::new(-150050, 2)), "-1,500.50");
    }

    #[test]
    fn test_channels_differ_only_in_grouping() {
        let amount = Decimal::new(2500075, 2);
        assert_eq!(fixed_2dp(amount), "25000.75");
        assert_eq!(grouped(amount), "25,000.75");
    }
}
