//! Plain-text rendering of the combined billing document
//!
//! Pages are separated by form feeds and each ends with a `Page N` footer,
//! so the output prints with the same pagination as the workbook.

use std::fmt::Write as _;
use std::path::Path;

use fuelslip_domain::model::{BillingRun, DocumentHeader, VehicleInvoiceResult};
use fuelslip_domain::render::BillingRenderer;
use fuelslip_types::Result;
use rust_decimal::Decimal;

use super::format::{format_amount, format_quantity, format_rate};

const RULE_WIDTH: usize = 78;
const PAGE_BREAK: char = '\u{000C}';

/// Renders a billing run to a printable text file
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

impl BillingRenderer for TextRenderer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn render(&self, run: &BillingRun, output: &Path) -> Result<()> {
        std::fs::write(output, render_text(run))?;
        tracing::debug!(path = %output.display(), "wrote text invoices");
        Ok(())
    }
}

/// Render the whole document to a string
pub fn render_text(run: &BillingRun) -> String {
    let mut pages = Vec::with_capacity(run.invoices.len() + 1);
    pages.push(summary_page(run));
    for invoice in &run.invoices {
        pages.push(invoice_page(&run.header, invoice));
    }

    let mut out = String::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            out.push(PAGE_BREAK);
        }
        out.push_str(page);
        let _ = writeln!(out, "\n{:>width$}", format!("Page {}", i + 1), width = RULE_WIDTH);
    }
    out
}

fn centered(out: &mut String, text: &str) {
    let _ = writeln!(out, "{:^width$}", text, width = RULE_WIDTH);
}

fn rule(out: &mut String, ch: char) {
    let _ = writeln!(out, "{}", ch.to_string().repeat(RULE_WIDTH));
}

fn summary_page(run: &BillingRun) -> String {
    let summary = &run.summary;
    let mut out = String::new();

    centered(&mut out, &run.header.company_name);
    centered(&mut out, "Invoice Summary");
    rule(&mut out, '=');
    let _ = writeln!(
        out,
        "{:<18} {:<12} {:<10} {:>18} {:>16}",
        "Vehicle No.", "Invoice No", "Product", "Amount (Rs)", "Total Qty (Ltr)"
    );
    rule(&mut out, '-');
    for line in &summary.lines {
        let _ = writeln!(
            out,
            "{:<18} {:<12} {:<10} {:>18} {:>16}",
            line.vehicle,
            line.invoice_label,
            line.product,
            format_amount(line.total_amount),
            format_quantity(line.total_quantity)
        );
    }
    rule(&mut out, '-');
    let _ = writeln!(
        out,
        "{:<18} {:<12} {:<10} {:>18} {:>16}",
        "",
        "Total",
        "",
        format_amount(summary.total_amount),
        format_quantity(summary.total_quantity)
    );

    if !summary.warnings.is_empty() {
        let _ = writeln!(out, "\nUnbilled residuals:");
        for warning in &summary.warnings {
            let _ = writeln!(out, "  {}", warning);
        }
    }
    if !summary.rejected.is_empty() {
        let _ = writeln!(out, "\nRejected rows:");
        for rejection in &summary.rejected {
            let _ = writeln!(out, "  {}", rejection);
        }
    }

    out
}

fn invoice_page(header: &DocumentHeader, invoice: &VehicleInvoiceResult) -> String {
    let mut out = String::new();

    centered(&mut out, &header.company_name);
    centered(&mut out, &format!("INVOICE # {}", invoice.invoice_label()));
    rule(&mut out, '=');
    let _ = writeln!(out, "Customer Name: {}", header.customer_name);
    let _ = writeln!(out, "Account #:     {}", header.account_number);
    let _ = writeln!(
        out,
        "Billing Period From: {}  To: {}",
        header.billing_from, header.billing_to
    );
    let _ = writeln!(out, "\nVehicle: {}\n", invoice.vehicle);

    let _ = writeln!(
        out,
        "{:>5} {:<12} {:>8} {:<8} {:>14} {:>9} {:>15}",
        "S.No", "Slip Date", "Slip #", "Product", "Quantity (Ltr)", "Rate", "Amount (Rs)"
    );
    rule(&mut out, '-');
    for slip in &invoice.slips {
        let _ = writeln!(
            out,
            "{:>5} {:<12} {:>8} {:<8} {:>14} {:>9} {:>15}",
            slip.index,
            header.slip_date,
            slip.number,
            slip.product,
            format_quantity(slip.quantity),
            format_rate(slip.rate),
            format_amount(slip.amount)
        );
    }
    rule(&mut out, '-');
    let _ = writeln!(
        out,
        "{:>5} {:<12} {:>8} {:<8} {:>14} {:>9} {:>15}",
        "",
        "",
        "",
        "Total",
        format_quantity(invoice.total_quantity),
        "",
        format_amount(invoice.total_amount)
    );
    if invoice.residual > Decimal::ZERO {
        let _ = writeln!(out, "Unbilled residual: {}", format_amount(invoice.residual));
    }

    let _ = writeln!(out, "\n\n{:>width$}", "Authorized Signature: ____________________", width = RULE_WIDTH);
    out
}
