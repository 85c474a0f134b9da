//! Core types shared across Backdrop facilities
//!
//! - **Correlation types**: RequestId, attached to every catalog mutation
//! - **Schema constants**: canonical structured-logging field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::RequestId;
