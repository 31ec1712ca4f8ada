//! Output formatting module

use fuelslip_app::export::format::{format_amount, format_quantity, format_rate};
use fuelslip_app::export::summary_json;
use fuelslip_domain::model::{BillingRun, BillingSummary, VehicleAllocation};
use fuelslip_types::{OutputFormat, Result};
use serde::Serialize;

/// How one input row will be read
#[derive(Debug, Serialize)]
pub struct PreviewRow {
    pub row: usize,
    pub vehicle: Option<String>,
    pub amount: Option<String>,
    pub start_slip: Option<String>,
    pub product: Option<String>,
    pub rate: Option<String>,
    pub slips: Option<usize>,
    pub status: String,
}

pub fn output_summary(output_format: OutputFormat, run: &BillingRun) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", summary_json(run)?);
        return Ok(());
    }

    let summary = &run.summary;
    println!("\n{}", run.header.company_name);
    println!("Invoice Summary");
    println!("===============");
    println!(
        "{:<18} {:<12} {:<8} {:>6} {:>16} {:>12}",
        "Vehicle No.", "Invoice No", "Product", "Slips", "Amount (Rs)", "Qty (Ltr)"
    );
    println!("{}", "-".repeat(77));
    for line in &summary.lines {
        println!(
            "{:<18} {:<12} {:<8} {:>6} {:>16} {:>12}",
            line.vehicle,
            line.invoice_label,
            line.product,
            line.slip_count,
            format_amount(line.total_amount),
            format_quantity(line.total_quantity)
        );
    }
    println!("{}", "-".repeat(77));
    println!(
        "{:<18} {:<12} {:<8} {:>6} {:>16} {:>12}",
        "Total",
        "",
        "",
        "",
        format_amount(summary.total_amount),
        format_quantity(summary.total_quantity)
    );
    println!("\nInvoices issued:     {}", summary.invoice_count());
    match summary.next_invoice_number {
        Some(next) => println!("Next invoice number: {}", next.value()),
        None => println!("Next invoice number: (exhausted)"),
    }

    Ok(())
}

/// Residual warnings and rejected rows go to stderr
pub fn report_problems(summary: &BillingSummary) {
    for warning in &summary.warnings {
        eprintln!("Warning: {}", warning);
    }
    for rejection in &summary.rejected {
        eprintln!("Rejected: {}", rejection);
    }
    match (summary.rejected.len(), summary.next_invoice_number) {
        (0, _) => {}
        (count, Some(next)) => eprintln!(
            "{} row(s) were not billed; fix them and re-run with --start-invoice {} to continue numbering",
            count,
            next.value()
        ),
        (count, None) => eprintln!("{} row(s) were not billed; invoice numbers are exhausted", count),
    }
}

pub fn output_allocation(output_format: OutputFormat, allocation: &VehicleAllocation) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(allocation)?);
        return Ok(());
    }

    println!(
        "{:>5} {:>10} {:<8} {:>14} {:>9} {:>15}",
        "S.No", "Slip #", "Product", "Quantity (Ltr)", "Rate", "Amount (Rs)"
    );
    println!("{}", "-".repeat(66));
    for slip in &allocation.slips {
        println!(
            "{:>5} {:>10} {:<8} {:>14} {:>9} {:>15}",
            slip.index,
            slip.number,
            slip.product,
            format_quantity(slip.quantity),
            format_rate(slip.rate),
            format_amount(slip.amount)
        );
    }
    println!("{}", "-".repeat(66));
    println!(
        "{:>5} {:>10} {:<8} {:>14} {:>9} {:>15}",
        "",
        "",
        "Total",
        format_quantity(allocation.total_quantity),
        "",
        format_amount(allocation.total_amount)
    );
    if allocation.has_residual() {
        println!("Unbilled residual: {}", format_amount(allocation.residual));
    }

    Ok(())
}

pub fn output_preview(output_format: OutputFormat, rows: &[PreviewRow]) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    let cell = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    println!(
        "{:>5} {:<18} {:>14} {:>10} {:<8} {:>8} {:>6}  Status",
        "Row", "Vehicle", "Amount", "StartSlip", "Product", "Rate", "Slips"
    );
    println!("{}", "-".repeat(90));
    for row in rows {
        println!(
            "{:>5} {:<18} {:>14} {:>10} {:<8} {:>8} {:>6}  {}",
            row.row,
            cell(&row.vehicle),
            cell(&row.amount),
            cell(&row.start_slip),
            cell(&row.product),
            cell(&row.rate),
            row.slips.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            row.status
        );
    }

    let ok = rows.iter().filter(|r| r.slips.is_some()).count();
    println!("\n{} row(s), {} ready, {} rejected", rows.len(), ok, rows.len() - ok);

    Ok(())
}
