//! Billing summary and run-level document model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::invoice::{InvoiceNumber, VehicleInvoiceResult};

/// One line of the summary page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub vehicle: String,
    pub invoice_number: InvoiceNumber,
    pub invoice_label: String,
    pub product: String,
    pub total_amount: Decimal,
    pub total_quantity: Decimal,
    pub slip_count: usize,
    pub residual: Decimal,
}

impl From<&VehicleInvoiceResult> for SummaryLine {
    fn from(invoice: &VehicleInvoiceResult) -> Self {
        Self {
            vehicle: invoice.vehicle.clone(),
            invoice_number: invoice.invoice_number,
            invoice_label: invoice.invoice_label(),
            product: invoice.product.clone(),
            total_amount: invoice.total_amount,
            total_quantity: invoice.total_quantity,
            slip_count: invoice.slips.len(),
            residual: invoice.residual,
        }
    }
}

/// Amount a rounding policy left unbilled for a vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualWarning {
    pub row: usize,
    pub vehicle: String,
    pub invoice_label: String,
    pub residual: Decimal,
}

impl std::fmt::Display for ResidualWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {} vehicle {} ({}): unbilled residual {}",
            self.row, self.vehicle, self.invoice_label, self.residual
        )
    }
}

/// An input row that was not billed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRejection {
    pub row: usize,
    pub vehicle: Option<String>,
    pub reason: String,
}

impl std::fmt::Display for RowRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.vehicle {
            Some(v) => write!(f, "row {} (vehicle {}): {}", self.row, v, self.reason),
            None => write!(f, "row {}: {}", self.row, self.reason),
        }
    }
}

impl From<RowRejection> for fuelslip_types::Error {
    fn from(rejection: RowRejection) -> Self {
        fuelslip_types::Error::MalformedRow {
            row: rejection.row,
            vehicle: rejection.vehicle,
            reason: rejection.reason,
        }
    }
}

/// Machine-readable summary of a billing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingSummary {
    pub lines: Vec<SummaryLine>,
    pub total_amount: Decimal,
    pub total_quantity: Decimal,
    pub total_residual: Decimal,
    /// First invoice number not consumed by this run; `None` once
    /// `u32::MAX` has been issued
    pub next_invoice_number: Option<InvoiceNumber>,
    pub warnings: Vec<ResidualWarning>,
    pub rejected: Vec<RowRejection>,
}

impl BillingSummary {
    pub fn invoice_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.rejected.is_empty()
    }
}

/// Display strings printed at the top of every invoice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub company_name: String,
    pub customer_name: String,
    pub account_number: String,
    pub billing_from: String,
    pub billing_to: String,
    pub slip_date: String,
}

/// Everything a renderer needs for the combined document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingRun {
    pub header: DocumentHeader,
    pub invoices: Vec<VehicleInvoiceResult>,
    pub summary: BillingSummary,
    pub generated_at: DateTime<Utc>,
}
