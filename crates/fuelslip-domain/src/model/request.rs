//! Per-vehicle billing request built from one input row

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Slip quantity used when nothing else is configured (litres per slip)
pub const DEFAULT_SLIP_CAPACITY: Decimal = Decimal::from_parts(40, 0, 0, false, 0);

/// Product label used when the input row carries none
pub const DEFAULT_PRODUCT: &str = "HSD";

/// Largest starting slip number accepted from input rows or configuration
pub const MAX_START_SLIP: u64 = u32::MAX as u64;

/// One vehicle's purchase, ready for slip allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleBillingRequest {
    /// Physical row in the input file (header is row 1)
    pub row: usize,
    /// Vehicle identifier, e.g. "LEA-1234"
    pub vehicle: String,
    /// Total purchased amount in currency units
    pub total_amount: Decimal,
    /// Price per litre
    pub rate: Decimal,
    /// Maximum litres per slip
    pub slip_capacity: Decimal,
    /// First slip number. `None` continues after the previous vehicle.
    pub start_slip: Option<u64>,
    pub product: String,
}

impl VehicleBillingRequest {
    pub fn new(row: usize, vehicle: impl Into<String>, total_amount: Decimal, rate: Decimal) -> Self {
        Self {
            row,
            vehicle: vehicle.into(),
            total_amount,
            rate,
            slip_capacity: DEFAULT_SLIP_CAPACITY,
            start_slip: None,
            product: DEFAULT_PRODUCT.to_string(),
        }
    }

    pub fn with_start_slip(mut self, start_slip: u64) -> Self {
        self.start_slip = Some(start_slip);
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn with_slip_capacity(mut self, slip_capacity: Decimal) -> Self {
        self.slip_capacity = slip_capacity;
        self
    }

    /// Vehicles with nothing to bill produce no slips at all
    pub fn is_billable(&self) -> bool {
        self.total_amount > Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let req = VehicleBillingRequest::new(2, "LEA-1234", dec!(11000), dec!(275));
        assert_eq!(req.slip_capacity, dec!(40));
        assert_eq!(req.product, "HSD");
        assert_eq!(req.start_slip, None);
    }

    #[test]
    fn test_is_billable() {
        let req = VehicleBillingRequest::new(2, "LEA-1234", dec!(0), dec!(275));
        assert!(!req.is_billable());
        let req = VehicleBillingRequest::new(2, "LEA-1234", dec!(0.01), dec!(275));
        assert!(req.is_billable());
    }
}
