//! Summary aggregation across vehicles

use rust_decimal::Decimal;

use crate::model::{BillingSummary, ResidualWarning, RowRejection, SummaryLine, VehicleInvoiceResult};
use crate::service::numbering::InvoiceCounter;

/// Build the run summary from numbered invoices in input order
pub fn summarize(
    invoices: &[VehicleInvoiceResult],
    counter: InvoiceCounter,
    rejected: Vec<RowRejection>,
) -> BillingSummary {
    let lines: Vec<SummaryLine> = invoices.iter().map(SummaryLine::from).collect();

    let total_amount: Decimal = invoices.iter().map(|i| i.total_amount).sum();
    let total_quantity: Decimal = invoices.iter().map(|i| i.total_quantity).sum();
    let total_residual: Decimal = invoices.iter().map(|i| i.residual).sum();

    let warnings = invoices
        .iter()
        .filter(|i| i.residual > Decimal::ZERO)
        .map(|i| ResidualWarning {
            row: i.row,
            vehicle: i.vehicle.clone(),
            invoice_label: i.invoice_label(),
            residual: i.residual,
        })
        .collect();

    BillingSummary {
        lines,
        total_amount,
        total_quantity,
        total_residual,
        next_invoice_number: counter.peek(),
        warnings,
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::allocator::allocate_request;
    use crate::service::numbering::number_invoices;
    use crate::model::{InvoiceNumber, VehicleBillingRequest};
    use fuelslip_types::RoundingPolicy;
    use rust_decimal_macros::dec;

    fn run(requests: &[VehicleBillingRequest], policy: RoundingPolicy) -> BillingSummary {
        let allocations = requests
            .iter()
            .map(|r| allocate_request(r, policy).unwrap())
            .collect();
        let counter = InvoiceCounter::starting_at(1).unwrap();
        let (invoices, counter) = number_invoices(allocations, counter).unwrap();
        summarize(&invoices, counter, Vec::new())
    }

    #[test]
    fn test_grand_totals_are_sums() {
        let requests = vec![
            VehicleBillingRequest::new(2, "A", dec!(11137.50), dec!(275)).with_start_slip(100),
            VehicleBillingRequest::new(3, "B", dec!(0), dec!(275)).with_start_slip(200),
            VehicleBillingRequest::new(4, "C", dec!(55000), dec!(275)).with_start_slip(300),
        ];
        let summary = run(&requests, RoundingPolicy::Fractional);

        assert_eq!(summary.invoice_count(), 3);
        assert_eq!(summary.total_amount, dec!(66137.50));
        assert_eq!(summary.total_quantity, dec!(240.5));
        assert_eq!(summary.lines[1].slip_count, 0);
        assert_eq!(summary.lines[1].invoice_label, "INV-0002");
        assert_eq!(summary.next_invoice_number, Some(InvoiceNumber::new(4)));
        assert!(summary.is_clean());
    }

    #[test]
    fn test_residuals_become_warnings() {
        let requests = vec![
            VehicleBillingRequest::new(2, "A", dec!(11137.50), dec!(275)).with_start_slip(100),
            VehicleBillingRequest::new(3, "B", dec!(11000), dec!(275)).with_start_slip(200),
        ];
        let summary = run(&requests, RoundingPolicy::Truncated);

        assert_eq!(summary.warnings.len(), 1);
        assert_eq!(summary.warnings[0].vehicle, "A");
        assert_eq!(summary.warnings[0].invoice_label, "INV-0001");
        assert_eq!(summary.warnings[0].residual, dec!(137.50));
        assert_eq!(summary.total_residual, dec!(137.50));
        assert_eq!(summary.total_amount, dec!(22000));
        assert!(!summary.is_clean());
    }
}
