//! Rendering interface for billing documents
//!
//! Renderers only see the data model; typesetting, number formatting and
//! pagination are their own business.

use std::path::Path;

use fuelslip_types::Error;

use crate::model::BillingRun;

/// Writes a finished billing run to a file
pub trait BillingRenderer {
    /// Short name used in logs, e.g. "excel"
    fn name(&self) -> &'static str;

    /// Render the whole run (summary page plus one section per vehicle)
    fn render(&self, run: &BillingRun, output: &Path) -> Result<(), Error>;
}
