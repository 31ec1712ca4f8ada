//! Invoice numbering and slip-number continuation
//!
//! Numbers are handed out by value: every issue consumes the counter and
//! returns the advanced one, so a run's numbering is a plain fold over
//! vehicles in input order.

use fuelslip_types::{Error, Result};

use crate::model::{InvoiceNumber, RowRejection, VehicleAllocation, VehicleInvoiceResult};

/// Gapless invoice number sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceCounter {
    /// `None` once `u32::MAX` has been issued
    next: Option<u32>,
}

impl InvoiceCounter {
    pub fn starting_at(start: u32) -> Result<Self> {
        if start < 1 {
            return Err(Error::invalid_config("start_invoice", "must be at least 1"));
        }
        Ok(Self { next: Some(start) })
    }

    /// Issue the next number and return the advanced counter
    pub fn issue(self) -> Result<(InvoiceNumber, InvoiceCounter)> {
        let current = self
            .next
            .ok_or_else(|| Error::invalid_config("start_invoice", "invoice numbers exhausted"))?;
        let advanced = InvoiceCounter {
            next: current.checked_add(1),
        };
        Ok((InvoiceNumber::new(current), advanced))
    }

    /// Preview the next number without consuming it; `None` when exhausted
    pub fn peek(&self) -> Option<InvoiceNumber> {
        self.next.map(InvoiceNumber::new)
    }
}

/// Give rows without an explicit `StartSlip` the slip numbers following the
/// previous vehicle. `allocations` must already be in input order.
///
/// A vehicle whose continued numbers would overflow is taken out of the run
/// and returned as a rejection; the cursor stays where it was.
pub fn continue_slip_numbers(
    allocations: Vec<VehicleAllocation>,
    default_start: u64,
) -> (Vec<VehicleAllocation>, Vec<RowRejection>) {
    let mut next_slip = Some(default_start);
    let mut numbered = Vec::with_capacity(allocations.len());
    let mut rejected = Vec::new();

    for mut allocation in allocations {
        if !allocation.explicit_start && !allocation.slips.is_empty() {
            let renumbered = next_slip
                .ok_or_else(|| Error::AmountOverflow("slip number exceeds u64".to_string()))
                .and_then(|start| allocation.renumber_from(start));
            if let Err(e) = renumbered {
                rejected.push(RowRejection {
                    row: allocation.row,
                    vehicle: Some(allocation.vehicle.clone()),
                    reason: e.to_string(),
                });
                continue;
            }
        }
        // Vehicles without slips leave the cursor where it was
        if let Some(last) = allocation.last_slip_number() {
            next_slip = last.checked_add(1);
        }
        numbered.push(allocation);
    }

    (numbered, rejected)
}

/// Number allocations in order, one invoice per vehicle
pub fn number_invoices(
    allocations: Vec<VehicleAllocation>,
    counter: InvoiceCounter,
) -> Result<(Vec<VehicleInvoiceResult>, InvoiceCounter)> {
    let mut counter = counter;
    let mut invoices = Vec::with_capacity(allocations.len());
    for allocation in allocations {
        let (number, advanced) = counter.issue()?;
        invoices.push(allocation.into_invoice(number));
        counter = advanced;
    }
    Ok((invoices, counter))
}
