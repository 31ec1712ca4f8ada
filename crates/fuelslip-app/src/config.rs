//! Configuration management for fuelslip
//!
//! Config stored at: ~/.config/fuelslip/config.json
//!
//! A billing profile (TOML or JSON with the same field names) can be loaded
//! instead, e.g. one file per customer.

use std::path::{Path, PathBuf};

use fuelslip_domain::model::{DocumentHeader, DEFAULT_PRODUCT, DEFAULT_SLIP_CAPACITY, MAX_START_SLIP};
use fuelslip_infra::RowDefaults;
use fuelslip_types::{ConfigError, Error, OutputFormat, Result, RoundingPolicy};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Title printed on every page
    #[serde(default = "default_company_name")]
    pub company_name: String,

    #[serde(default)]
    pub customer_name: String,

    #[serde(default)]
    pub account_number: String,

    /// Billing period start, display only (e.g. "01-Sep-2025")
    #[serde(default)]
    pub billing_from: String,

    /// Billing period end, display only (e.g. "30-Sep-2025")
    #[serde(default)]
    pub billing_to: String,

    /// Date label printed on every slip (e.g. "Sep-2025")
    #[serde(default)]
    pub slip_date: String,

    /// Rate per litre for rows without a Rate column
    #[serde(default = "default_rate")]
    pub default_rate: Decimal,

    /// Product for rows without a Product column
    #[serde(default = "default_product")]
    pub default_product: String,

    #[serde(default = "default_start")]
    pub start_invoice: u32,

    /// First slip number for rows without StartSlip
    #[serde(default = "default_start_slip")]
    pub start_slip: u64,

    /// Litres per slip
    #[serde(default = "default_slip_capacity")]
    pub slip_capacity: Decimal,

    #[serde(default)]
    pub rounding: RoundingPolicy,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,

    /// Parallel allocation workers. 0 = CPU count.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

fn default_company_name() -> String {
    "NOOR PETROLEUM SERVICES".to_string()
}

fn default_rate() -> Decimal {
    Decimal::from(275)
}

fn default_product() -> String {
    DEFAULT_PRODUCT.to_string()
}

fn default_start() -> u32 {
    1
}

fn default_start_slip() -> u64 {
    1
}

fn default_slip_capacity() -> Decimal {
    DEFAULT_SLIP_CAPACITY
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_jobs() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            company_name: default_company_name(),
            customer_name: String::new(),
            account_number: String::new(),
            billing_from: String::new(),
            billing_to: String::new(),
            slip_date: String::new(),
            default_rate: default_rate(),
            default_product: default_product(),
            start_invoice: default_start(),
            start_slip: default_start_slip(),
            slip_capacity: default_slip_capacity(),
            rounding: RoundingPolicy::default(),
            output_format: default_output_format(),
            jobs: default_jobs(),
        }
    }
}

/// Settings that passed validation; nothing downstream re-checks them
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationSettings {
    pub defaults: RowDefaults,
    pub start_slip: u64,
    pub rounding: RoundingPolicy,
}

/// Validated settings for a full billing run
#[derive(Debug, Clone, PartialEq)]
pub struct BillingSettings {
    pub header: DocumentHeader,
    pub allocation: AllocationSettings,
    pub start_invoice: u32,
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("fuelslip");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load a config or billing profile; `.toml` files are read as TOML
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        if is_toml {
            toml::from_str(&content).map_err(|e| {
                Error::Config(ConfigError::ParseError(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            })
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::Config(ConfigError::ParseError(format!("{}: {}", path.display(), e))))
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| Error::Config(ConfigError::SaveError(format!("{}: {}", path.display(), e))))?;
        Ok(())
    }

    /// Validate the numeric settings the allocator depends on
    pub fn allocation_settings(&self) -> Result<AllocationSettings> {
        if self.default_rate <= Decimal::ZERO {
            return Err(Error::invalid_config(
                "default_rate",
                format!("must be greater than zero (got {})", self.default_rate),
            ));
        }
        if self.slip_capacity <= Decimal::ZERO {
            return Err(Error::invalid_config(
                "slip_capacity",
                format!("must be greater than zero (got {})", self.slip_capacity),
            ));
        }
        if self.start_slip < 1 || self.start_slip > MAX_START_SLIP {
            return Err(Error::invalid_config(
                "start_slip",
                format!("must be between 1 and {} (got {})", MAX_START_SLIP, self.start_slip),
            ));
        }
        if self.default_product.trim().is_empty() {
            return Err(Error::invalid_config("default_product", "must not be empty"));
        }

        Ok(AllocationSettings {
            defaults: RowDefaults {
                rate: self.default_rate,
                product: self.default_product.trim().to_string(),
                slip_capacity: self.slip_capacity,
            },
            start_slip: self.start_slip,
            rounding: self.rounding,
        })
    }

    /// Validate everything a billing run needs, before any row is read
    pub fn settings(&self) -> Result<BillingSettings> {
        let allocation = self.allocation_settings()?;

        if self.start_invoice < 1 {
            return Err(Error::invalid_config("start_invoice", "must be at least 1"));
        }

        let required = [
            ("customer_name", &self.customer_name),
            ("account_number", &self.account_number),
            ("slip_date", &self.slip_date),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::invalid_config(field, "is required"));
            }
        }

        Ok(BillingSettings {
            header: DocumentHeader {
                company_name: self.company_name.trim().to_string(),
                customer_name: self.customer_name.trim().to_string(),
                account_number: self.account_number.trim().to_string(),
                billing_from: self.billing_from.trim().to_string(),
                billing_to: self.billing_to.trim().to_string(),
                slip_date: self.slip_date.trim().to_string(),
            },
            allocation,
            start_invoice: self.start_invoice,
        })
    }

    /// Worker count with 0 resolved to the CPU count
    pub fn resolved_jobs(&self) -> usize {
        match self.jobs {
            0 => num_cpus::get(),
            n => n,
        }
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let or_unset = |s: &str| {
            if s.trim().is_empty() {
                "(not set)".to_string()
            } else {
                s.to_string()
            }
        };

        writeln!(f, "Fuel Slip Billing Configuration")?;
        writeln!(f, "===============================")?;
        writeln!(f)?;
        writeln!(f, "Company:        {}", self.company_name)?;
        writeln!(f, "Customer:       {}", or_unset(&self.customer_name))?;
        writeln!(f, "Account #:      {}", or_unset(&self.account_number))?;
        writeln!(
            f,
            "Billing period: {} - {}",
            or_unset(&self.billing_from),
            or_unset(&self.billing_to)
        )?;
        writeln!(f, "Slip date:      {}", or_unset(&self.slip_date))?;
        writeln!(f, "Default rate:   {}", self.default_rate)?;
        writeln!(f, "Product:        {}", self.default_product)?;
        writeln!(f, "Slip capacity:  {} L", self.slip_capacity)?;
        writeln!(f, "Start invoice:  {}", self.start_invoice)?;
        writeln!(f, "Start slip:     {}", self.start_slip)?;
        writeln!(f, "Rounding:       {}", self.rounding)?;
        writeln!(f, "Output format:  {}", self.output_format)?;
        writeln!(f, "Jobs:           {}", self.jobs)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:    {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn complete() -> Config {
        Config {
            customer_name: "Al-Habib Logistics".to_string(),
            account_number: "ACC-778".to_string(),
            billing_from: "01-Sep-2025".to_string(),
            billing_to: "30-Sep-2025".to_string(),
            slip_date: "Sep-2025".to_string(),
            ..Config::default()
        }
    }

    fn field_of(err: Error) -> String {
        match err {
            Error::InvalidConfiguration { field, .. } => field,
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_rate, dec!(275));
        assert_eq!(config.slip_capacity, dec!(40));
        assert_eq!(config.default_product, "HSD");
        assert_eq!(config.start_invoice, 1);
        assert_eq!(config.rounding, RoundingPolicy::Fractional);
    }

    #[test]
    fn test_settings_require_document_fields() {
        let err = Config::default().settings().unwrap_err();
        assert_eq!(field_of(err), "customer_name");

        let mut config = complete();
        config.slip_date = "  ".to_string();
        assert_eq!(field_of(config.settings().unwrap_err()), "slip_date");

        let settings = complete().settings().unwrap();
        assert_eq!(settings.header.customer_name, "Al-Habib Logistics");
        assert_eq!(settings.allocation.defaults.rate, dec!(275));
    }

    #[test]
    fn test_settings_reject_bad_numbers() {
        let mut config = complete();
        config.default_rate = dec!(0);
        assert_eq!(field_of(config.settings().unwrap_err()), "default_rate");

        let mut config = complete();
        config.slip_capacity = dec!(-40);
        assert_eq!(field_of(config.settings().unwrap_err()), "slip_capacity");

        let mut config = complete();
        config.start_invoice = 0;
        assert_eq!(field_of(config.settings().unwrap_err()), "start_invoice");

        let mut config = complete();
        config.start_slip = 0;
        assert_eq!(field_of(config.settings().unwrap_err()), "start_slip");

        let mut config = complete();
        config.start_slip = u64::MAX;
        assert_eq!(field_of(config.settings().unwrap_err()), "start_slip");

        let mut config = complete();
        config.start_slip = MAX_START_SLIP + 1;
        assert_eq!(field_of(config.settings().unwrap_err()), "start_slip");

        let mut config = complete();
        config.start_slip = MAX_START_SLIP;
        assert!(config.settings().is_ok());
    }

    #[test]
    fn test_toml_profile_with_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customer.toml");
        std::fs::write(
            &path,
            "customer_name = \"Al-Habib Logistics\"\naccount_number = \"ACC-778\"\nslip_date = \"Sep-2025\"\ndefault_rate = 280.5\nrounding = \"truncated\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.customer_name, "Al-Habib Logistics");
        assert_eq!(config.default_rate, dec!(280.5));
        assert_eq!(config.rounding, RoundingPolicy::Truncated);
        assert_eq!(config.slip_capacity, dec!(40));
        assert!(config.settings().is_ok());
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = complete();
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_resolved_jobs() {
        let mut config = Config::default();
        config.jobs = 3;
        assert_eq!(config.resolved_jobs(), 3);
        config.jobs = 0;
        assert!(config.resolved_jobs() >= 1);
    }
}
