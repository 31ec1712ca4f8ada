//! End-to-end billing runs: input file -> assembler -> rendered documents

use std::fs;

use calamine::{open_workbook_auto, Data, Reader};
use fuelslip_app::export::{ExcelRenderer, JsonSummaryWriter, TextRenderer};
use fuelslip_app::{Config, ReportAssembler};
use fuelslip_domain::render::BillingRenderer;
use fuelslip_infra::load_rows;
use fuelslip_types::{Error, RoundingPolicy};
use rust_decimal_macros::dec;
use tempfile::TempDir;

const VEHICLES_CSV: &str = "\
Vehicle,Amount,StartSlip
LEA-1234,\"55,000\",100
LES-77,11137.50,200
TKR-9,0,
JKL-55,,300
MNO-1,275,
";

fn config() -> Config {
    Config {
        customer_name: "Al-Habib Logistics".to_string(),
        account_number: "ACC-778".to_string(),
        billing_from: "01-Sep-2025".to_string(),
        billing_to: "30-Sep-2025".to_string(),
        slip_date: "Sep-2025".to_string(),
        ..Config::default()
    }
}

fn write_input(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("vehicles.csv");
    fs::write(&path, VEHICLES_CSV).unwrap();
    path
}

#[test]
fn test_csv_to_invoices() {
    let dir = TempDir::new().unwrap();
    let rows = load_rows(&write_input(&dir)).unwrap();
    assert_eq!(rows.len(), 5);

    let run = ReportAssembler::new(config().settings().unwrap())
        .with_jobs(3)
        .assemble(&rows)
        .unwrap();

    // JKL-55 has no amount and is rejected without taking an invoice number
    assert_eq!(run.summary.rejected.len(), 1);
    assert_eq!(run.summary.rejected[0].row, 5);
    assert_eq!(run.invoices.len(), 4);

    let labels: Vec<String> = run.invoices.iter().map(|i| i.invoice_label()).collect();
    assert_eq!(labels, ["INV-0001", "INV-0002", "INV-0003", "INV-0004"]);

    assert_eq!(run.invoices[0].slips.len(), 5);
    assert_eq!(run.invoices[1].slips.last().unwrap().number, 201);
    assert!(run.invoices[2].slips.is_empty());
    // MNO-1 continues after LES-77
    assert_eq!(run.invoices[3].slips[0].number, 202);
    assert_eq!(run.invoices[3].slips[0].quantity, dec!(1));

    assert_eq!(run.summary.total_amount, dec!(66412.50));
    assert!(run.summary.warnings.is_empty());
}

#[test]
fn test_all_documents_are_written() {
    let dir = TempDir::new().unwrap();
    let rows = load_rows(&write_input(&dir)).unwrap();
    let run = ReportAssembler::new(config().settings().unwrap())
        .assemble(&rows)
        .unwrap();

    let xlsx = dir.path().join("combined_invoices.xlsx");
    let txt = dir.path().join("combined_invoices.txt");
    let json = dir.path().join("summary.json");

    let renderers: [(&dyn BillingRenderer, &std::path::Path); 3] = [
        (&ExcelRenderer, xlsx.as_path()),
        (&TextRenderer, txt.as_path()),
        (&JsonSummaryWriter, json.as_path()),
    ];
    for (renderer, path) in renderers {
        renderer.render(&run, path).unwrap();
        assert!(path.exists(), "{} output missing", renderer.name());
    }

    let mut workbook = open_workbook_auto(&xlsx).unwrap();
    let range = workbook.worksheet_range("Invoices").unwrap();
    let headings = range
        .rows()
        .flat_map(|r| r.iter())
        .filter(|c| matches!(c, Data::String(s) if s.starts_with("INVOICE # ")))
        .count();
    assert_eq!(headings, 4);

    let text = fs::read_to_string(&txt).unwrap();
    assert_eq!(text.matches('\u{000C}').count(), 4);
    assert!(text.contains("Page 5"));

    let summary: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(summary["summary"]["lines"].as_array().unwrap().len(), 4);
    assert_eq!(summary["summary"]["next_invoice_number"], 5);
}

#[test]
fn test_profile_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let profile = dir.path().join("customer.toml");
    fs::write(
        &profile,
        r#"
customer_name = "Karachi Freight"
account_number = "KF-01"
slip_date = "Oct-2025"
default_rate = "250"
start_invoice = 41
rounding = "truncated"
"#,
    )
    .unwrap();

    let config = Config::load_from(&profile).unwrap();
    assert_eq!(config.rounding, RoundingPolicy::Truncated);

    let rows = load_rows(&write_input(&dir)).unwrap();
    let run = ReportAssembler::new(config.settings().unwrap())
        .assemble(&rows)
        .unwrap();

    assert_eq!(run.invoices[0].invoice_label(), "INV-0041");
    assert_eq!(run.header.customer_name, "Karachi Freight");
    // 11137.50 at 250/L: 44.55 L, truncated to 44 L with 137.50 unbilled
    assert_eq!(run.invoices[1].residual, dec!(137.50));
    assert_eq!(run.summary.warnings.len(), 2);
}

#[test]
fn test_all_or_nothing_rejects_batch() {
    let dir = TempDir::new().unwrap();
    let rows = load_rows(&write_input(&dir)).unwrap();
    let err = ReportAssembler::new(config().settings().unwrap())
        .all_or_nothing(true)
        .assemble(&rows)
        .unwrap_err();
    assert!(matches!(err, Error::BatchRejected { rejected: 1 }));
}

#[test]
fn test_missing_required_field_fails_before_rows() {
    let mut cfg = config();
    cfg.account_number.clear();
    let err = cfg.settings().unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration { ref field, .. } if field == "account_number"));
}
