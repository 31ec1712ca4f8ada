//! Per-vehicle allocation results and invoice numbers

use fuelslip_types::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::slip::Slip;

/// Externally visible invoice number, rendered as `INV-0001`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(u32);

impl InvoiceNumber {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn label(&self) -> String {
        format!("INV-{:04}", self.0)
    }
}

impl std::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "INV-{:04}", self.0)
    }
}

/// Slips and totals for one vehicle, before an invoice number is assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleAllocation {
    pub row: usize,
    pub vehicle: String,
    pub product: String,
    pub rate: Decimal,
    pub slip_capacity: Decimal,
    pub slips: Vec<Slip>,
    pub total_quantity: Decimal,
    pub total_amount: Decimal,
    /// Amount left unbilled by the rounding policy; zero under the fractional policy
    pub residual: Decimal,
    /// Whether the input row named its own starting slip number
    pub explicit_start: bool,
}

impl VehicleAllocation {
    pub fn last_slip_number(&self) -> Option<u64> {
        self.slips.last().map(|s| s.number)
    }

    pub fn has_residual(&self) -> bool {
        self.residual > Decimal::ZERO
    }

    /// Shift slip numbers so the run starts at `start`, keeping contiguity.
    /// Slips are left untouched when the run would pass `u64::MAX`.
    pub fn renumber_from(&mut self, start: u64) -> Result<()> {
        let span = self.slips.len().saturating_sub(1) as u64;
        start.checked_add(span).ok_or_else(|| {
            Error::AmountOverflow(format!(
                "{} slips starting at {} exceed u64",
                self.slips.len(),
                start
            ))
        })?;

        for (offset, slip) in self.slips.iter_mut().enumerate() {
            slip.number = start + offset as u64;
        }
        Ok(())
    }

    pub fn into_invoice(self, invoice_number: InvoiceNumber) -> VehicleInvoiceResult {
        VehicleInvoiceResult {
            invoice_number,
            row: self.row,
            vehicle: self.vehicle,
            product: self.product,
            rate: self.rate,
            slips: self.slips,
            total_quantity: self.total_quantity,
            total_amount: self.total_amount,
            residual: self.residual,
        }
    }
}

/// A numbered, itemized invoice for one vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleInvoiceResult {
    pub invoice_number: InvoiceNumber,
    pub row: usize,
    pub vehicle: String,
    pub product: String,
    pub rate: Decimal,
    pub slips: Vec<Slip>,
    pub total_quantity: Decimal,
    pub total_amount: Decimal,
    pub residual: Decimal,
}

impl VehicleInvoiceResult {
    pub fn invoice_label(&self) -> String {
        self.invoice_number.label()
    }

    /// Amount the input row asked to bill (billed + unbilled)
    pub fn requested_amount(&self) -> Decimal {
        self.total_amount + self.residual
    }
}
