//! Display formatting for amounts and quantities

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round half away from zero, the way printed invoices expect
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// "11,137.50"
pub fn format_amount(value: Decimal) -> String {
    let fixed = format!("{:.2}", round2(value));
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0.00" is just zero
    let sign = if grouped.chars().all(|c| c == '0' || c == ',') && fraction == "00" {
        ""
    } else {
        sign
    };

    format!("{}{}.{}", sign, grouped, fraction)
}

/// Litres with at most two decimals and no trailing zeros ("40", "0.5")
pub fn format_quantity(value: Decimal) -> String {
    round2(value).normalize().to_string()
}

/// Rates print like quantities ("275", "283.17")
pub fn format_rate(value: Decimal) -> String {
    format_quantity(value)
}

/// Spreadsheet cells take floats; decimal values here are far inside f64 range
pub fn as_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(11137.5)), "11,137.50");
        assert_eq!(format_amount(dec!(0)), "0.00");
        assert_eq!(format_amount(dec!(999.999)), "1,000.00");
        assert_eq!(format_amount(dec!(1234567.891)), "1,234,567.89");
        assert_eq!(format_amount(dec!(100)), "100.00");
        assert_eq!(format_amount(dec!(-2500.5)), "-2,500.50");
        assert_eq!(format_amount(dec!(-0.001)), "0.00");
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round2(dec!(0.125)), dec!(0.13));
        assert_eq!(round2(dec!(0.135)), dec!(0.14));
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(dec!(40)), "40");
        assert_eq!(format_quantity(dec!(0.5)), "0.5");
        assert_eq!(format_quantity(dec!(0.36363636)), "0.36");
        assert_eq!(format_quantity(dec!(240.50)), "240.5");
    }
}
