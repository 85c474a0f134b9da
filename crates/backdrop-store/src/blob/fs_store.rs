//! File-backed asset store
//!
//! One file per key under `<root>/wallpapers`, written atomically.

use async_trait::async_trait;
use backdrop_core::keys::parse_key;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::blob::atomic::atomic_write;
use crate::blob::{validate_key, AssetStore, BackendKind};
use crate::errors::{backend_unavailable, io_error, write_failed, Result};

/// Fixed subdirectory of the configured root holding the blobs
pub const WALLPAPER_DIR: &str = "wallpapers";

const PROBE_FILE: &str = ".probe";

/// Filesystem-backed asset store
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    dir: PathBuf,
}

impl FsAssetStore {
    /// Open the store under `root`, verifying the directory is writable
    ///
    /// # Errors
    ///
    /// `BackendUnavailable` if the directory cannot be created or a probe
    /// file cannot be written and removed.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let dir = root.as_ref().join(WALLPAPER_DIR);

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| backend_unavailable("file", format!("{}: {}", dir.display(), e)))?;

        let probe = dir.join(PROBE_FILE);
        fs::write(&probe, b"probe")
            .await
            .map_err(|e| backend_unavailable("file", format!("{}: {}", probe.display(), e)))?;
        fs::remove_file(&probe)
            .await
            .map_err(|e| backend_unavailable("file", format!("{}: {}", probe.display(), e)))?;

        Ok(Self { dir })
    }

    /// Directory holding the blob files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    fn kind(&self) -> BackendKind {
        BackendKind::FileBacked
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        atomic_write(&path, bytes)
            .await
            .map_err(|e| write_failed(key, e.message()).with_source(e))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("get", e).with_key(key)),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("delete", e).with_key(key)),
        }
    }

    async fn list_keys(&self) -> Result<Option<Vec<String>>> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| io_error("list_keys", e))?;

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error("list_keys", e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| io_error("list_keys", e))?;
            if !file_type.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if parse_key(&name).is_some() {
                keys.push(name);
            }
        }

        keys.sort();
        Ok(Some(keys))
    }
}
