//! Loaders for vehicle billing rows
//!
//! Accepts delimited text (CSV/TSV) or the first sheet of a spreadsheet.
//! Both are reduced to [`RawRow`]s keyed by the same column names:
//!
//! Vehicle, Amount, [StartSlip], [Product], [Rate]

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use encoding_rs::{UTF_8, WINDOWS_1252};
use fuelslip_types::{Error, Result};
use serde::Serialize;

/// One input row with its cells still as text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawRow {
    /// 1-based physical row; the header is row 1
    pub row: usize,
    pub vehicle: Option<String>,
    pub amount: Option<String>,
    pub start_slip: Option<String>,
    pub product: Option<String>,
    pub rate: Option<String>,
}

/// Input file flavour, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Delimited { delimiter: u8 },
    Spreadsheet,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "txt" => Ok(InputKind::Delimited { delimiter: b',' }),
            "tsv" => Ok(InputKind::Delimited { delimiter: b'\t' }),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(InputKind::Spreadsheet),
            _ => Err(Error::UnsupportedInput(format!(
                "{} (expected .csv, .tsv, .xlsx, .xls or .ods)",
                path.display()
            ))),
        }
    }
}

/// Load billing rows from a CSV or spreadsheet file
pub fn load_rows(path: &Path) -> Result<Vec<RawRow>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }

    let rows = match InputKind::from_path(path)? {
        InputKind::Delimited { delimiter } => {
            let bytes = fs::read(path)?;
            load_delimited_rows(&bytes, delimiter)?
        }
        InputKind::Spreadsheet => load_spreadsheet_rows(path)?,
    };

    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded billing rows");
    Ok(rows)
}

/// Parse delimited text. Bytes that are not UTF-8 are read as Windows-1252.
pub fn load_delimited_rows(bytes: &[u8], delimiter: u8) -> Result<Vec<RawRow>> {
    let text = decode_text(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::Csv(e.to_string()))?
        .clone();
    let columns = ColumnMap::from_headers(headers.iter())?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| Error::Csv(e.to_string()))?;
        let row_num = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);

        if let Some(row) = columns.extract(row_num, |i| record.get(i).map(str::to_string)) {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Read the first worksheet; its first non-empty row is the header
pub fn load_spreadsheet_rows(path: &Path) -> Result<Vec<RawRow>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| Error::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Spreadsheet(format!("{} has no worksheets", path.display())))?
        .map_err(|e| Error::Spreadsheet(e.to_string()))?;

    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    let mut sheet_rows = range.rows().enumerate();

    let header_cells: Vec<String> = match sheet_rows.next() {
        Some((_, cells)) => cells.iter().map(|c| cell_text(c).unwrap_or_default()).collect(),
        None => return Err(Error::MissingColumn("Vehicle".to_string())),
    };
    let columns = ColumnMap::from_headers(header_cells.iter().map(String::as_str))?;

    let mut rows = Vec::new();
    for (offset, cells) in sheet_rows {
        let row_num = first_row + offset + 1;
        if let Some(row) = columns.extract(row_num, |i| cells.get(i).and_then(cell_text)) {
            rows.push(row);
        }
    }

    Ok(rows)
}

fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return text;
    }

    tracing::warn!("input is not valid UTF-8, reading it as Windows-1252");
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.trim().to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        other => Some(other.to_string()),
    }
}

/// Column positions resolved from a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    vehicle: usize,
    amount: usize,
    start_slip: Option<usize>,
    product: Option<usize>,
    rate: Option<usize>,
}

impl ColumnMap {
    fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let names: Vec<String> = headers.into_iter().map(normalize_header).collect();
        let find = |wanted: &str| names.iter().position(|n| n == wanted);

        Ok(Self {
            vehicle: find("vehicle").ok_or_else(|| Error::MissingColumn("Vehicle".to_string()))?,
            amount: find("amount").ok_or_else(|| Error::MissingColumn("Amount".to_string()))?,
            start_slip: find("startslip"),
            product: find("product"),
            rate: find("rate"),
        })
    }

    /// Pull this map's columns out of one row; `None` for an entirely blank row
    fn extract(&self, row: usize, cell: impl Fn(usize) -> Option<String>) -> Option<RawRow> {
        let get = |idx: usize| cell(idx).filter(|s| !s.trim().is_empty());
        let get_opt = |idx: Option<usize>| idx.and_then(&get);

        let raw = RawRow {
            row,
            vehicle: get(self.vehicle),
            amount: get(self.amount),
            start_slip: get_opt(self.start_slip),
            product: get_opt(self.product),
            rate: get_opt(self.rate),
        };

        let blank = raw.vehicle.is_none()
            && raw.amount.is_none()
            && raw.start_slip.is_none()
            && raw.product.is_none()
            && raw.rate.is_none();
        if blank {
            None
        } else {
            Some(raw)
        }
    }
}

/// "Start Slip", "start_slip" and "StartSlip" all name the same column
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .collect::<String>()
        .to_lowercase()
}
