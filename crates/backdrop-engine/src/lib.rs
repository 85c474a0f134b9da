//! Backdrop Engine - catalog orchestration
//!
//! [`CatalogManager`] ties the domain model in `backdrop-core` to the asset
//! and settings stores in `backdrop-store`. It is an explicit context object:
//! build one per process (or per test) and pass it to whatever needs it.

pub mod manager;
pub mod reconcile;

pub use manager::CatalogManager;
pub use reconcile::{reconcile, Reconciled};
