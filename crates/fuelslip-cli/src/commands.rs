//! Command implementations

use std::path::PathBuf;

use fuelslip_app::export::{ExcelRenderer, JsonSummaryWriter, TextRenderer, DEFAULT_OUTPUT_FILE};
use fuelslip_app::{Config, ReportAssembler};
use fuelslip_domain::model::VehicleBillingRequest;
use fuelslip_domain::render::BillingRenderer;
use fuelslip_domain::service::allocate_request;
use fuelslip_infra::{load_rows, parse_row};
use fuelslip_types::{Error, OutputFormat, Result, RoundingPolicy};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;

use crate::cli::{BillingOverrides, Cli, Commands, ConfigUpdates};
use crate::output::{self, PreviewRow};

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    // A profile replaces the saved config for this run
    let mut config = match &cli.profile {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let output_format = cli.format.unwrap_or(config.output_format);

    match &cli.command {
        Commands::Generate {
            input,
            output,
            text,
            summary_json,
            overrides,
            jobs,
            all_or_nothing,
        } => {
            apply_overrides(&mut config, overrides);
            if let Some(jobs) = jobs {
                config.jobs = *jobs;
            }
            let outputs = GenerateOutputs {
                workbook: output.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
                text: text.clone(),
                summary_json: summary_json.clone(),
            };
            cmd_generate(&cli, &config, input.clone(), outputs, *all_or_nothing, output_format)
        }

        Commands::Preview { input } => cmd_preview(&config, input.clone(), output_format),

        Commands::Allocate {
            amount,
            rate,
            start_slip,
            capacity,
            product,
            rounding,
        } => {
            if let Some(rate) = rate {
                config.default_rate = *rate;
            }
            if let Some(start_slip) = start_slip {
                config.start_slip = *start_slip;
            }
            if let Some(capacity) = capacity {
                config.slip_capacity = *capacity;
            }
            if let Some(product) = product {
                config.default_product = product.clone();
            }
            if let Some(rounding) = rounding {
                config.rounding = *rounding;
            }
            cmd_allocate(&config, *amount, output_format)
        }

        Commands::Config { show, set, reset } => cmd_config(*show, set.clone(), *reset),
    }
}

fn apply_overrides(config: &mut Config, overrides: &BillingOverrides) {
    if let Some(customer) = &overrides.customer {
        config.customer_name = customer.clone();
    }
    if let Some(account) = &overrides.account {
        config.account_number = account.clone();
    }
    if let Some(from) = &overrides.from {
        config.billing_from = from.clone();
    }
    if let Some(to) = &overrides.to {
        config.billing_to = to.clone();
    }
    if let Some(slip_date) = &overrides.slip_date {
        config.slip_date = slip_date.clone();
    }
    if let Some(rate) = overrides.rate {
        config.default_rate = rate;
    }
    if let Some(product) = &overrides.product {
        config.default_product = product.clone();
    }
    if let Some(start_invoice) = overrides.start_invoice {
        config.start_invoice = start_invoice;
    }
    if let Some(capacity) = overrides.capacity {
        config.slip_capacity = capacity;
    }
    if let Some(rounding) = overrides.rounding {
        config.rounding = rounding;
    }
}

struct GenerateOutputs {
    workbook: PathBuf,
    text: Option<PathBuf>,
    summary_json: Option<PathBuf>,
}

fn cmd_generate(
    cli: &Cli,
    config: &Config,
    input: PathBuf,
    outputs: GenerateOutputs,
    all_or_nothing: bool,
    output_format: OutputFormat,
) -> Result<()> {
    // Settings are checked before the input is even opened
    let settings = config.settings()?;
    if settings.allocation.rounding == RoundingPolicy::Truncated {
        tracing::warn!("truncated rounding may leave part of an amount unbilled");
    }

    let rows = load_rows(&input)?;
    if rows.is_empty() {
        return Err(Error::EmptyInput(input.display().to_string()));
    }

    let assembler = ReportAssembler::new(settings)
        .with_jobs(config.resolved_jobs())
        .all_or_nothing(all_or_nothing);

    if cli.verbose {
        eprintln!(
            "Found {} rows in {} ({} parallel jobs)",
            rows.len(),
            input.display(),
            config.resolved_jobs()
        );
    }

    let pb = if cli.verbose {
        let pb = ProgressBar::new(rows.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message("allocating");
        pb
    } else {
        ProgressBar::hidden()
    };

    let run = assembler.assemble_with_progress(&rows, &|| pb.inc(1));
    pb.finish_and_clear();
    let run = run?;

    ExcelRenderer.render(&run, &outputs.workbook)?;
    eprintln!("Invoices written to: {}", outputs.workbook.display());

    if let Some(path) = &outputs.text {
        TextRenderer.render(&run, path)?;
        eprintln!("Text invoices written to: {}", path.display());
    }
    if let Some(path) = &outputs.summary_json {
        JsonSummaryWriter.render(&run, path)?;
        eprintln!("Summary written to: {}", path.display());
    }

    output::output_summary(output_format, &run)?;
    output::report_problems(&run.summary);

    Ok(())
}

fn cmd_preview(config: &Config, input: PathBuf, output_format: OutputFormat) -> Result<()> {
    let settings = config.allocation_settings()?;
    let rows = load_rows(&input)?;

    let preview: Vec<PreviewRow> = rows
        .into_iter()
        .map(|raw| {
            let outcome = parse_row(&raw, &settings.defaults)
                .map_err(|r| r.reason)
                .and_then(|req| allocate_request(&req, settings.rounding).map_err(|e| e.to_string()));
            let (slips, status) = match outcome {
                Ok(allocation) if allocation.has_residual() => (
                    Some(allocation.slips.len()),
                    format!("ok, {} unbilled", allocation.residual),
                ),
                Ok(allocation) => (Some(allocation.slips.len()), "ok".to_string()),
                Err(reason) => (None, reason),
            };
            PreviewRow {
                row: raw.row,
                vehicle: raw.vehicle,
                amount: raw.amount,
                start_slip: raw.start_slip,
                product: raw.product,
                rate: raw.rate,
                slips,
                status,
            }
        })
        .collect();

    output::output_preview(output_format, &preview)
}

fn cmd_allocate(config: &Config, amount: Decimal, output_format: OutputFormat) -> Result<()> {
    let settings = config.allocation_settings()?;
    let request = VehicleBillingRequest::new(0, "-", amount, settings.defaults.rate)
        .with_start_slip(settings.start_slip)
        .with_product(settings.defaults.product.clone())
        .with_slip_capacity(settings.defaults.slip_capacity);

    let allocation = allocate_request(&request, settings.rounding)?;
    output::output_allocation(output_format, &allocation)
}

fn cmd_config(show: bool, set: ConfigUpdates, reset: bool) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(company) = set.set_company {
        config.company_name = company;
        modified = true;
    }
    if let Some(customer) = set.set_customer {
        config.customer_name = customer;
        modified = true;
    }
    if let Some(account) = set.set_account {
        config.account_number = account;
        modified = true;
    }
    if let Some(from) = set.set_from {
        config.billing_from = from;
        modified = true;
    }
    if let Some(to) = set.set_to {
        config.billing_to = to;
        modified = true;
    }
    if let Some(slip_date) = set.set_slip_date {
        config.slip_date = slip_date;
        modified = true;
    }
    if let Some(rate) = set.set_rate {
        config.default_rate = rate;
        modified = true;
    }
    if let Some(product) = set.set_product {
        config.default_product = product;
        modified = true;
    }
    if let Some(start_invoice) = set.set_start_invoice {
        config.start_invoice = start_invoice;
        modified = true;
    }
    if let Some(start_slip) = set.set_start_slip {
        config.start_slip = start_slip;
        modified = true;
    }
    if let Some(capacity) = set.set_capacity {
        config.slip_capacity = capacity;
        modified = true;
    }
    if let Some(rounding) = set.set_rounding {
        config.rounding = rounding;
        modified = true;
    }
    if let Some(output_format) = set.set_output {
        config.output_format = output_format;
        modified = true;
    }
    if let Some(jobs) = set.set_jobs {
        config.jobs = jobs;
        modified = true;
    }

    if modified {
        // Refuse to save values a billing run would reject
        config.allocation_settings()?;
        if config.start_invoice < 1 {
            return Err(Error::invalid_config("start_invoice", "must be at least 1"));
        }
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
