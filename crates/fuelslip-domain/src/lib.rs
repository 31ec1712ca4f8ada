//! Fuel slip billing domain
//!
//! Data model, slip allocation, invoice numbering and summary aggregation.
//! Nothing in here performs I/O.

pub mod model;
pub mod render;
pub mod service;
