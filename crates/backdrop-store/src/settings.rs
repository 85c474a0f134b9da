//! Persisted settings blob
//!
//! The catalog and current selection are saved as one small JSON document
//! after every mutation and read back once at startup.

use async_trait::async_trait;
use backdrop_core::SettingsSnapshot;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::blob::atomic_write;
use crate::errors::{io_error, serialization_error, Result};

/// Storage for the [`SettingsSnapshot`]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// The saved snapshot, or `None` if nothing has been saved yet
    async fn load(&self) -> Result<Option<SettingsSnapshot>>;

    async fn save(&self, snapshot: &SettingsSnapshot) -> Result<()>;
}

/// Pretty-printed JSON file, replaced atomically on every save
#[derive(Debug, Clone)]
pub struct JsonSettingsFile {
    path: PathBuf,
}

impl JsonSettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsFile {
    async fn load(&self) -> Result<Option<SettingsSnapshot>> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("load_settings", e)),
        };

        let snapshot = serde_json::from_slice(&contents)
            .map_err(|e| serialization_error("load_settings", e))?;
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &SettingsSnapshot) -> Result<()> {
        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| serialization_error("save_settings", e))?;
        atomic_write(&self.path, &json).await
    }
}

/// In-process settings, for tests and embedding
///
/// Saves can be made to fail on demand to exercise rollback paths.
#[derive(Debug, Default)]
pub struct MemorySettings {
    snapshot: Mutex<Option<SettingsSnapshot>>,
    fail_saves: AtomicBool,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: SettingsSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Make subsequent saves fail with a `Persistence` error
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The last successfully saved snapshot
    pub fn saved(&self) -> Option<SettingsSnapshot> {
        self.snapshot
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn load(&self) -> Result<Option<SettingsSnapshot>> {
        Ok(self.saved())
    }

    async fn save(&self, snapshot: &SettingsSnapshot) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(backdrop_core::BdError::new(backdrop_core::BdErrorKind::Persistence)
                .with_op("save_settings")
                .with_message("settings store rejected the save"));
        }
        let mut guard = self
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(snapshot.clone());
        Ok(())
    }
}
