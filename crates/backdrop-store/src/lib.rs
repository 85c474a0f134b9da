//! Backdrop Store - persistence for wallpaper bytes and the settings blob
//!
//! Provides:
//! - [`AssetStore`]: async put/get/delete of image bytes by key
//! - File-backed store (preferred) and SQLite store (fallback)
//! - Startup capability probe choosing one backend for the process lifetime
//! - Settings blob persistence (catalog + current selection)
//! - SQLite migrations framework

pub mod backend;
pub mod blob;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod settings;

// Re-export key types
pub use backend::{open_backend, BackendSelection};
pub use blob::{AssetStore, BackendKind, FsAssetStore, SqliteAssetStore};
pub use errors::Result;
pub use settings::{JsonSettingsFile, MemorySettings, SettingsStore};
