//! Catalog data model
//!
//! - [`AssetRecord`]: metadata for one stored wallpaper
//! - [`Catalog`]: newest-first, duplicate-free, never-empty record list
//! - [`CurrentSelection`]: the key of the wallpaper currently applied
//! - [`SettingsSnapshot`]: the persisted mirror of catalog + selection

pub mod asset;
pub mod catalog;
pub mod selection;
pub mod snapshot;

pub use asset::{AssetRecord, DEFAULT_ASSET_ID, DEFAULT_ASSET_KEY};
pub use catalog::Catalog;
pub use selection::CurrentSelection;
pub use snapshot::SettingsSnapshot;
