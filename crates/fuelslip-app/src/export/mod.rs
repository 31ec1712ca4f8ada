//! Document export: workbook, printable text, JSON summary

pub mod excel;
pub mod format;
pub mod json;
pub mod text;

pub use excel::{export_to_excel, ExcelRenderer};
pub use json::{summary_json, JsonSummaryWriter};
pub use text::{render_text, TextRenderer};

/// Default workbook name for `generate`
pub const DEFAULT_OUTPUT_FILE: &str = "combined_invoices.xlsx";
