//! CLI definition using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fuelslip_types::{OutputFormat, RoundingPolicy};
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(name = "fuelslip")]
#[command(author = "noor-petroleum")]
#[command(version)]
#[command(about = "Split per-vehicle fuel amounts into fixed-capacity slips and print invoices")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Billing profile (.toml or .json) used instead of the saved config
    #[arg(long, global = true)]
    pub profile: Option<PathBuf>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Per-run overrides of the document fields and allocation settings
#[derive(clap::Args, Debug, Default, Clone)]
pub struct BillingOverrides {
    /// Customer name printed on each invoice
    #[arg(long)]
    pub customer: Option<String>,

    /// Customer account number
    #[arg(long)]
    pub account: Option<String>,

    /// Billing period start (free text, e.g. 01-Sep-2025)
    #[arg(long)]
    pub from: Option<String>,

    /// Billing period end
    #[arg(long)]
    pub to: Option<String>,

    /// Date printed on every slip line
    #[arg(long)]
    pub slip_date: Option<String>,

    /// Default price per litre for rows without a Rate column
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Default product for rows without a Product column
    #[arg(long)]
    pub product: Option<String>,

    /// First invoice number of this run
    #[arg(long)]
    pub start_invoice: Option<u32>,

    /// Litres per full slip
    #[arg(long)]
    pub capacity: Option<Decimal>,

    /// How the last partial slip is sized
    #[arg(long, value_enum)]
    pub rounding: Option<RoundingPolicy>,
}

/// `config --set-*` flags
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ConfigUpdates {
    /// Set the company name printed as the title
    #[arg(long)]
    pub set_company: Option<String>,

    /// Set customer name
    #[arg(long)]
    pub set_customer: Option<String>,

    /// Set account number
    #[arg(long)]
    pub set_account: Option<String>,

    /// Set billing period start
    #[arg(long)]
    pub set_from: Option<String>,

    /// Set billing period end
    #[arg(long)]
    pub set_to: Option<String>,

    /// Set slip date
    #[arg(long)]
    pub set_slip_date: Option<String>,

    /// Set default rate per litre
    #[arg(long)]
    pub set_rate: Option<Decimal>,

    /// Set default product
    #[arg(long)]
    pub set_product: Option<String>,

    /// Set next invoice number
    #[arg(long)]
    pub set_start_invoice: Option<u32>,

    /// Set default starting slip number
    #[arg(long)]
    pub set_start_slip: Option<u64>,

    /// Set litres per slip
    #[arg(long)]
    pub set_capacity: Option<Decimal>,

    /// Set rounding policy
    #[arg(long, value_enum)]
    pub set_rounding: Option<RoundingPolicy>,

    /// Set default output format
    #[arg(long)]
    pub set_output: Option<OutputFormat>,

    /// Set default number of workers (0 = CPU count)
    #[arg(long)]
    pub set_jobs: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the combined invoice document from a vehicle list
    Generate {
        /// Vehicle list (.csv, .tsv, .xlsx, .xls, .ods)
        input: PathBuf,

        /// Output workbook
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Also write a printable text version
        #[arg(long)]
        text: Option<PathBuf>,

        /// Also write the summary as JSON
        #[arg(long)]
        summary_json: Option<PathBuf>,

        #[command(flatten)]
        overrides: BillingOverrides,

        /// Number of parallel allocation workers. 0 = auto (CPU count).
        #[arg(long, short = 'j')]
        jobs: Option<usize>,

        /// Fail the whole run if any row is malformed
        #[arg(long)]
        all_or_nothing: bool,
    },

    /// Show how each input row will be read, without generating anything
    Preview {
        /// Vehicle list (.csv, .tsv, .xlsx, .xls, .ods)
        input: PathBuf,
    },

    /// Split a single amount into slips
    Allocate {
        /// Total amount to bill
        #[arg(long, short = 'a')]
        amount: Decimal,

        /// Price per litre. Uses config value if not specified.
        #[arg(long, short = 'r')]
        rate: Option<Decimal>,

        /// First slip number. Uses config value if not specified.
        #[arg(long, short = 's')]
        start_slip: Option<u64>,

        /// Litres per full slip
        #[arg(long)]
        capacity: Option<Decimal>,

        /// Product name
        #[arg(long)]
        product: Option<String>,

        /// How the last partial slip is sized
        #[arg(long, value_enum)]
        rounding: Option<RoundingPolicy>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        #[command(flatten)]
        set: ConfigUpdates,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}
