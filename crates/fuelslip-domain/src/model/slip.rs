use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One delivery slip within a vehicle's purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slip {
    pub index: usize,      // S.No, 1-based within the vehicle
    pub number: u64,       // Slip #
    pub product: String,   // HSD, PMG, ...
    pub quantity: Decimal, // litres, never above slip capacity
    pub rate: Decimal,     // price per litre
    pub amount: Decimal,   // quantity x rate (exact remainder on a fractional tail)
}

impl Slip {
    /// A slip holding less than the full capacity
    pub fn is_partial(&self, slip_capacity: Decimal) -> bool {
        self.quantity < slip_capacity
    }
}
