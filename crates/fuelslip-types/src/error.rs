//! Error types for fuelslip

use thiserror::Error;

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Caller-supplied settings that make allocation impossible.
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Malformed row {row}{}: {reason}", vehicle_suffix(.vehicle))]
    MalformedRow {
        row: usize,
        vehicle: Option<String>,
        reason: String,
    },

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Unsupported input file: {0}")]
    UnsupportedInput(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Excel export error: {0}")]
    Excel(String),

    #[error("Amount overflow while allocating: {0}")]
    AmountOverflow(String),

    #[error("Batch rejected: {rejected} row(s) failed validation")]
    BatchRejected { rejected: usize },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("No vehicle rows found in {0}")]
    EmptyInput(String),
}

fn vehicle_suffix(vehicle: &Option<String>) -> String {
    match vehicle {
        Some(v) => format!(" (vehicle {})", v),
        None => String::new(),
    }
}

impl Error {
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
