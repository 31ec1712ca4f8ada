//! Domain services

pub mod aggregation;
pub mod allocator;
pub mod numbering;

pub use aggregation::summarize;
pub use allocator::{allocate, allocate_request, allocate_with_policy, Allocation, MAX_SLIPS_PER_VEHICLE};
pub use numbering::{continue_slip_numbers, number_invoices, InvoiceCounter};
