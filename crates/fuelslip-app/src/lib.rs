//! Application service layer - config, report assembly, document export

pub mod assembler;
pub mod config;
pub mod export;

pub use assembler::ReportAssembler;
pub use config::{AllocationSettings, BillingSettings, Config};
