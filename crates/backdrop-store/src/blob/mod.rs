//! Asset byte storage
//!
//! Two interchangeable backends behind [`AssetStore`]:
//! - [`FsAssetStore`]: one file per key under `<root>/wallpapers`
//! - [`SqliteAssetStore`]: one row per key in the embedded database

mod atomic;
mod fs_store;
mod sqlite_store;

pub use atomic::atomic_write;
pub use fs_store::{FsAssetStore, WALLPAPER_DIR};
pub use sqlite_store::SqliteAssetStore;

use async_trait::async_trait;
use std::fmt;

use crate::errors::{invalid_key, Result};

/// Which backend is serving asset bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    FileBacked,
    EmbeddedDb,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::FileBacked => "file-backed",
            BackendKind::EmbeddedDb => "embedded-db",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value storage for raw image bytes
///
/// Keys are opaque to the store beyond [`validate_key`]. Reads of absent
/// keys yield `Ok(None)`; deletes of absent keys succeed.
#[async_trait]
pub trait AssetStore: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Store bytes under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a malformed key, `WriteFailed` if the bytes were
    /// not durably stored. A failed put never leaves a partial value behind.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// # Errors
    ///
    /// `InvalidInput` for a malformed key, `Io`/`Persistence` for backend failures.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// # Errors
    ///
    /// `InvalidInput` for a malformed key, `Io`/`Persistence` for backend failures.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Every stored key, if the backend can enumerate its contents
    ///
    /// `None` means the backend has no enumeration and the settings blob is
    /// the only source of truth for the catalog.
    async fn list_keys(&self) -> Result<Option<Vec<String>>>;
}

/// Reject keys that could escape a backend's namespace
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(invalid_key(key, "key must not be empty"));
    }
    if key.starts_with('.') {
        return Err(invalid_key(key, "key must not start with '.'"));
    }
    if key.contains(['/', '\\', '\0']) || key.contains("..") {
        return Err(invalid_key(key, "key must be a single path component"));
    }
    Ok(())
}
