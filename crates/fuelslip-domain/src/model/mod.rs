//! Domain model types

pub mod invoice;
pub mod request;
pub mod slip;
pub mod summary;

pub use invoice::{InvoiceNumber, VehicleAllocation, VehicleInvoiceResult};
pub use request::{VehicleBillingRequest, DEFAULT_PRODUCT, DEFAULT_SLIP_CAPACITY, MAX_START_SLIP};
pub use slip::Slip;
pub use summary::{
    BillingRun, BillingSummary, DocumentHeader, ResidualWarning, RowRejection, SummaryLine,
};
