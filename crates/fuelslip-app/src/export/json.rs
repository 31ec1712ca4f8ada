//! Machine-readable run summary

use std::path::Path;

use chrono::{DateTime, Utc};
use fuelslip_domain::model::{BillingRun, BillingSummary, DocumentHeader};
use fuelslip_domain::render::BillingRenderer;
use fuelslip_types::Result;
use serde::Serialize;

#[derive(Serialize)]
struct SummaryDocument<'a> {
    generated_at: &'a DateTime<Utc>,
    header: &'a DocumentHeader,
    summary: &'a BillingSummary,
}

/// Pretty-printed JSON of the header and summary
pub fn summary_json(run: &BillingRun) -> Result<String> {
    let doc = SummaryDocument {
        generated_at: &run.generated_at,
        header: &run.header,
        summary: &run.summary,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Writes [`summary_json`] to a file
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSummaryWriter;

impl BillingRenderer for JsonSummaryWriter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render(&self, run: &BillingRun, output: &Path) -> Result<()> {
        std::fs::write(output, summary_json(run)?)?;
        Ok(())
    }
}
