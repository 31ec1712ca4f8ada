//! Excel export of the combined billing document
//!
//! One worksheet laid out as print pages: the summary first, then one
//! section per vehicle, with a manual page break after each and the page
//! number in the footer.

use std::path::Path;

use fuelslip_domain::model::{BillingRun, DocumentHeader, VehicleInvoiceResult};
use fuelslip_domain::render::BillingRenderer;
use fuelslip_types::{Error, Result};
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use super::format::as_f64;

/// Excel caps manual page breaks per sheet
const MAX_PAGE_BREAKS: usize = 1023;

const LAST_COL: u16 = 6;

const SUMMARY_HEADERS: [&str; 5] = [
    "Vehicle No.",
    "Invoice No",
    "Product",
    "Amount (Rs)",
    "Total Qty (Ltr)",
];

const SLIP_HEADERS: [&str; 7] = [
    "S.No",
    "Slip Date",
    "Slip #",
    "Product",
    "Quantity (Ltr)",
    "Rate",
    "Amount (Rs)",
];

/// Renders a billing run to an .xlsx workbook
#[derive(Debug, Default, Clone, Copy)]
pub struct ExcelRenderer;

impl BillingRenderer for ExcelRenderer {
    fn name(&self) -> &'static str {
        "excel"
    }

    fn render(&self, run: &BillingRun, output: &Path) -> Result<()> {
        export_to_excel(run, output)
    }
}

struct Formats {
    title: Format,
    heading: Format,
    label: Format,
    header: Format,
    cell: Format,
    quantity: Format,
    amount: Format,
    total: Format,
    total_quantity: Format,
    total_amount: Format,
    warning: Format,
}

impl Formats {
    fn new() -> Self {
        let bordered = Format::new()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center);
        let total = bordered
            .clone()
            .set_bold()
            .set_background_color(Color::RGB(0xF2F2F2));

        Self {
            title: Format::new()
                .set_bold()
                .set_font_size(16)
                .set_align(FormatAlign::Center),
            heading: Format::new()
                .set_bold()
                .set_font_size(13)
                .set_align(FormatAlign::Center),
            label: Format::new().set_bold().set_border(FormatBorder::Thin),
            header: bordered
                .clone()
                .set_bold()
                .set_background_color(Color::RGB(0xD9D9D9)),
            cell: bordered.clone(),
            quantity: bordered.clone().set_num_format("0.00"),
            amount: bordered.clone().set_num_format("#,##0.00"),
            total_quantity: total.clone().set_num_format("0.00"),
            total_amount: total.clone().set_num_format("#,##0.00"),
            total,
            warning: Format::new().set_bold().set_font_color(Color::Red),
        }
    }
}

fn excel_err(e: XlsxError) -> Error {
    Error::Excel(e.to_string())
}

/// Export a billing run to an Excel file
pub fn export_to_excel(run: &BillingRun, output_path: &Path) -> Result<()> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Invoices").map_err(excel_err)?;
    setup_page(sheet)?;

    let mut row = write_summary_section(sheet, run, &formats)?;
    let mut page_breaks = vec![row];

    for invoice in &run.invoices {
        row = write_vehicle_section(sheet, &run.header, invoice, row, &formats)?;
        page_breaks.push(row);
    }

    // The last section needs no trailing break
    page_breaks.pop();
    if page_breaks.len() > MAX_PAGE_BREAKS {
        tracing::warn!(
            sections = page_breaks.len() + 1,
            "too many vehicles for manual page breaks, later sections will flow together"
        );
        page_breaks.truncate(MAX_PAGE_BREAKS);
    }
    if !page_breaks.is_empty() {
        sheet.set_page_breaks(&page_breaks).map_err(excel_err)?;
    }

    workbook.save(output_path).map_err(excel_err)?;
    tracing::debug!(path = %output_path.display(), "wrote Excel invoices");

    Ok(())
}

fn setup_page(sheet: &mut Worksheet) -> Result<()> {
    sheet.set_paper_size(9); // A4
    sheet.set_portrait();
    sheet.set_footer("&CPage &P");

    let widths = [16, 16, 12, 12, 16, 10, 16];
    for (col, width) in widths.iter().enumerate() {
        sheet.set_column_width(col as u16, *width).map_err(excel_err)?;
    }
    Ok(())
}

fn write_title(sheet: &mut Worksheet, row: u32, text: &str, format: &Format) -> Result<()> {
    sheet
        .merge_range(row, 0, row, LAST_COL, text, format)
        .map_err(excel_err)?;
    Ok(())
}

/// Returns the first row after the section
fn write_summary_section(sheet: &mut Worksheet, run: &BillingRun, formats: &Formats) -> Result<u32> {
    let summary = &run.summary;

    write_title(sheet, 0, &run.header.company_name, &formats.title)?;
    write_title(sheet, 1, "Invoice Summary", &formats.heading)?;

    let mut row = 3;
    for (col, header) in SUMMARY_HEADERS.iter().enumerate() {
        sheet
            .write_string_with_format(row, col as u16, *header, &formats.header)
            .map_err(excel_err)?;
    }
    row += 1;

    for line in &summary.lines {
        sheet
            .write_string_with_format(row, 0, &line.vehicle, &formats.cell)
            .map_err(excel_err)?;
        sheet
            .write_string_with_format(row, 1, &line.invoice_label, &formats.cell)
            .map_err(excel_err)?;
        sheet
            .write_string_with_format(row, 2, &line.product, &formats.cell)
            .map_err(excel_err)?;
        sheet
            .write_number_with_format(row, 3, as_f64(line.total_amount), &formats.amount)
            .map_err(excel_err)?;
        sheet
            .write_number_with_format(row, 4, as_f64(line.total_quantity), &formats.quantity)
            .map_err(excel_err)?;
        row += 1;
    }

    sheet.write_blank(row, 0, &formats.total).map_err(excel_err)?;
    sheet
        .write_string_with_format(row, 1, "Total", &formats.total)
        .map_err(excel_err)?;
    sheet.write_blank(row, 2, &formats.total).map_err(excel_err)?;
    sheet
        .write_number_with_format(row, 3, as_f64(summary.total_amount), &formats.total_amount)
        .map_err(excel_err)?;
    sheet
        .write_number_with_format(row, 4, as_f64(summary.total_quantity), &formats.total_quantity)
        .map_err(excel_err)?;
    row += 2;

    if !summary.warnings.is_empty() {
        sheet
            .write_string_with_format(row, 0, "Unbilled residuals", &formats.warning)
            .map_err(excel_err)?;
        row += 1;
        for warning in &summary.warnings {
            sheet
                .write_string(row, 0, warning.to_string())
                .map_err(excel_err)?;
            row += 1;
        }
        row += 1;
    }

    if !summary.rejected.is_empty() {
        sheet
            .write_string_with_format(row, 0, "Rejected rows", &formats.warning)
            .map_err(excel_err)?;
        row += 1;
        for rejection in &summary.rejected {
            sheet
                .write_string(row, 0, rejection.to_string())
                .map_err(excel_err)?;
            row += 1;
        }
    }

    Ok(row + 1)
}

fn write_vehicle_section(
    sheet: &mut Worksheet,
    header: &DocumentHeader,
    invoice: &VehicleInvoiceResult,
    start_row: u32,
    formats: &Formats,
) -> Result<u32> {
    let mut row = start_row;

    write_title(sheet, row, &header.company_name, &formats.title)?;
    write_title(
        sheet,
        row + 1,
        &format!("INVOICE # {}", invoice.invoice_label()),
        &formats.heading,
    )?;
    row += 3;

    // Customer / account / billing period block
    sheet
        .write_string_with_format(row, 0, "Customer Name:", &formats.label)
        .map_err(excel_err)?;
    sheet
        .merge_range(row, 1, row, LAST_COL, &header.customer_name, &formats.label)
        .map_err(excel_err)?;
    row += 1;
    sheet
        .write_string_with_format(row, 0, "Account #:", &formats.label)
        .map_err(excel_err)?;
    sheet
        .merge_range(row, 1, row, LAST_COL, &header.account_number, &formats.label)
        .map_err(excel_err)?;
    row += 1;
    sheet
        .write_string_with_format(row, 0, "Billing Period:", &formats.label)
        .map_err(excel_err)?;
    sheet
        .merge_range(row, 1, row, 3, &format!("From: {}", header.billing_from), &formats.label)
        .map_err(excel_err)?;
    sheet
        .merge_range(row, 4, row, LAST_COL, &format!("To: {}", header.billing_to), &formats.label)
        .map_err(excel_err)?;
    row += 2;

    sheet
        .write_string_with_format(row, 0, format!("Vehicle: {}", invoice.vehicle), &Format::new().set_bold())
        .map_err(excel_err)?;
    row += 2;

    for (col, title) in SLIP_HEADERS.iter().enumerate() {
        sheet
            .write_string_with_format(row, col as u16, *title, &formats.header)
            .map_err(excel_err)?;
    }
    row += 1;

    for slip in &invoice.slips {
        sheet
            .write_number_with_format(row, 0, slip.index as f64, &formats.cell)
            .map_err(excel_err)?;
        sheet
            .write_string_with_format(row, 1, &header.slip_date, &formats.cell)
            .map_err(excel_err)?;
        sheet
            .write_number_with_format(row, 2, slip.number as f64, &formats.cell)
            .map_err(excel_err)?;
        sheet
            .write_string_with_format(row, 3, &slip.product, &formats.cell)
            .map_err(excel_err)?;
        sheet
            .write_number_with_format(row, 4, as_f64(slip.quantity), &formats.quantity)
            .map_err(excel_err)?;
        sheet
            .write_number_with_format(row, 5, as_f64(slip.rate), &formats.cell)
            .map_err(excel_err)?;
        sheet
            .write_number_with_format(row, 6, as_f64(slip.amount), &formats.amount)
            .map_err(excel_err)?;
        row += 1;
    }

    for col in [0, 1, 2, 5] {
        sheet.write_blank(row, col, &formats.total).map_err(excel_err)?;
    }
    sheet
        .write_string_with_format(row, 3, "Total", &formats.total)
        .map_err(excel_err)?;
    sheet
        .write_number_with_format(row, 4, as_f64(invoice.total_quantity), &formats.total_quantity)
        .map_err(excel_err)?;
    sheet
        .write_number_with_format(row, 6, as_f64(invoice.total_amount), &formats.total_amount)
        .map_err(excel_err)?;
    row += 1;

    if invoice.residual > Decimal::ZERO {
        sheet
            .write_string_with_format(row, 3, "Unbilled residual", &formats.warning)
            .map_err(excel_err)?;
        sheet
            .write_number_with_format(row, 6, as_f64(invoice.residual), &formats.amount)
            .map_err(excel_err)?;
        row += 1;
    }

    row += 2;
    sheet
        .write_string(row, 4, "Authorized Signature: ____________________")
        .map_err(excel_err)?;

    Ok(row + 2)
}
