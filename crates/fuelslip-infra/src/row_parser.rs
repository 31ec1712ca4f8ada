//! Validation of raw rows into billing requests

use std::str::FromStr;

use fuelslip_domain::model::{RowRejection, VehicleBillingRequest, MAX_START_SLIP};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::billing_rows::RawRow;

/// Values used when a row leaves an optional column empty
#[derive(Debug, Clone, PartialEq)]
pub struct RowDefaults {
    pub rate: Decimal,
    pub product: String,
    pub slip_capacity: Decimal,
}

/// Turn one raw row into a request, or say why it cannot be billed
pub fn parse_row(raw: &RawRow, defaults: &RowDefaults) -> Result<VehicleBillingRequest, RowRejection> {
    let reject = |reason: String| RowRejection {
        row: raw.row,
        vehicle: raw.vehicle.clone(),
        reason,
    };

    let vehicle = raw
        .vehicle
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| reject("Vehicle is empty".to_string()))?;

    let amount_text = raw
        .amount
        .as_deref()
        .ok_or_else(|| reject("Amount is empty".to_string()))?;
    let total_amount = parse_decimal(amount_text)
        .ok_or_else(|| reject(format!("Amount '{}' is not a number", amount_text)))?;
    if total_amount < Decimal::ZERO {
        return Err(reject(format!("Amount {} is negative", total_amount)));
    }

    let rate = match raw.rate.as_deref() {
        Some(text) => {
            let rate =
                parse_decimal(text).ok_or_else(|| reject(format!("Rate '{}' is not a number", text)))?;
            if rate <= Decimal::ZERO {
                return Err(reject(format!("Rate {} must be greater than zero", rate)));
            }
            rate
        }
        None => defaults.rate,
    };

    let product = raw
        .product
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(&defaults.product);

    let mut request = VehicleBillingRequest::new(raw.row, vehicle, total_amount, rate)
        .with_product(product)
        .with_slip_capacity(defaults.slip_capacity);

    if let Some(text) = raw.start_slip.as_deref() {
        let start = parse_slip_number(text).ok_or_else(|| {
            reject(format!("StartSlip '{}' is not a positive whole number", text))
        })?;
        request = request.with_start_slip(start);
    }

    Ok(request)
}

/// Parse a number that may carry thousands separators ("1,234.50")
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let cleaned = s.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }

    if cleaned.contains(|c: char| c == 'e' || c == 'E') {
        Decimal::from_scientific(&cleaned).ok()
    } else {
        Decimal::from_str(&cleaned).ok()
    }
}

/// Slip numbers are whole, at least 1 and fit in 32 bits ("100.0" from a
/// spreadsheet is fine)
fn parse_slip_number(s: &str) -> Option<u64> {
    let value = parse_decimal(s)?;
    if !value.fract().is_zero() || value < Decimal::ONE || value > Decimal::from(MAX_START_SLIP) {
        return None;
    }
    value.to_u64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn defaults() -> RowDefaults {
        RowDefaults {
            rate: dec!(275),
            product: "HSD".to_string(),
            slip_capacity: dec!(40),
        }
    }

    fn raw(vehicle: Option<&str>, amount: Option<&str>) -> RawRow {
        RawRow {
            row: 3,
            vehicle: vehicle.map(str::to_string),
            amount: amount.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_decimal_with_comma() {
        assert_eq!(parse_decimal("1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_decimal(" 11000 "), Some(dec!(11000)));
        assert_eq!(parse_decimal("1.5e3"), Some(dec!(1500)));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn test_parse_slip_number() {
        assert_eq!(parse_slip_number("100"), Some(100));
        assert_eq!(parse_slip_number("100.0"), Some(100));
        assert_eq!(parse_slip_number("1,001"), Some(1001));
        assert_eq!(parse_slip_number("0"), None);
        assert_eq!(parse_slip_number("-3"), None);
        assert_eq!(parse_slip_number("10.5"), None);
        assert_eq!(parse_slip_number("99999999999"), None);
    }

    #[test]
    fn test_defaults_fill_optional_columns() {
        let request = parse_row(&raw(Some("LEA-1234"), Some("11,137.50")), &defaults()).unwrap();
        assert_eq!(request.row, 3);
        assert_eq!(request.vehicle, "LEA-1234");
        assert_eq!(request.total_amount, dec!(11137.50));
        assert_eq!(request.rate, dec!(275));
        assert_eq!(request.product, "HSD");
        assert_eq!(request.slip_capacity, dec!(40));
        assert_eq!(request.start_slip, None);
    }

    #[test]
    fn test_row_values_override_defaults() {
        let mut row = raw(Some("LEA-1234"), Some("5600"));
        row.rate = Some("280".to_string());
        row.product = Some("PMG".to_string());
        row.start_slip = Some("42".to_string());

        let request = parse_row(&row, &defaults()).unwrap();
        assert_eq!(request.rate, dec!(280));
        assert_eq!(request.product, "PMG");
        assert_eq!(request.start_slip, Some(42));
    }

    #[test]
    fn test_zero_amount_is_accepted() {
        let request = parse_row(&raw(Some("LEA-1234"), Some("0")), &defaults()).unwrap();
        assert_eq!(request.total_amount, dec!(0));
    }

    #[test]
    fn test_rejections_name_the_row() {
        let cases = [
            (raw(None, Some("100")), "Vehicle is empty"),
            (raw(Some("A"), None), "Amount is empty"),
            (raw(Some("A"), Some("lots")), "Amount 'lots' is not a number"),
            (raw(Some("A"), Some("-5")), "Amount -5 is negative"),
        ];

        for (row, reason) in cases {
            let rejection = parse_row(&row, &defaults()).unwrap_err();
            assert_eq!(rejection.row, 3);
            assert_eq!(rejection.reason, reason);
        }
    }

    #[test]
    fn test_bad_rate_and_start_slip() {
        let mut row = raw(Some("A"), Some("100"));
        row.rate = Some("0".to_string());
        let rejection = parse_row(&row, &defaults()).unwrap_err();
        assert_eq!(rejection.vehicle.as_deref(), Some("A"));
        assert!(rejection.reason.starts_with("Rate 0"));

        let mut row = raw(Some("A"), Some("100"));
        row.start_slip = Some("first".to_string());
        let rejection = parse_row(&row, &defaults()).unwrap_err();
        assert!(rejection.reason.starts_with("StartSlip 'first'"));
    }
}
