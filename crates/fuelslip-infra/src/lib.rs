//! Infrastructure layer - input loaders for vehicle billing rows

pub mod billing_rows;
pub mod row_parser;

pub use billing_rows::{load_rows, InputKind, RawRow};
pub use row_parser::{parse_decimal, parse_row, RowDefaults};
