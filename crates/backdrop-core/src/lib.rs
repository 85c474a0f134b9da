//! Backdrop Core - wallpaper catalog domain kernel
//!
//! This crate holds everything about wallpaper assets that does not touch a
//! storage backend:
//! - Asset records, the newest-first catalog and the current selection
//! - Asset key generation and parsing (`asset_<millis>_<random6>.<ext>`)
//! - Observer registry for catalog events
//! - Imaging: bounded downscaling and luminance-based contrast selection
//! - Error and logging facilities shared by the store, engine and CLI
//! - TOML configuration

pub mod config;
pub mod errors;
pub mod events;
pub mod imaging;
pub mod keys;
pub mod logging_facility;
pub mod model;

// Re-export commonly used types
pub use config::BackdropConfig;
pub use errors::{BdError, BdErrorKind, CatalogError, Result};
pub use events::{CatalogEvent, CatalogObserver, ObserverId, ObserverRegistry};
pub use model::{AssetRecord, Catalog, CurrentSelection, SettingsSnapshot};
