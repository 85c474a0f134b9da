//! Atomic write primitives
//!
//! Temp file then rename, so readers never observe a partial blob. The temp
//! name is a dotfile in the target directory (`.<name>.tmp`), which keeps it
//! out of key enumeration if a crash leaves it behind.

use crate::errors::{io_error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

fn temp_path_for(target_path: &Path) -> PathBuf {
    let name = target_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target_path.with_file_name(format!(".{}.tmp", name))
}

/// Atomically write bytes to a file
pub async fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error("create_blob_dir", e))?;
    }

    let temp_path = temp_path_for(target_path);

    if let Err(e) = fs::write(&temp_path, content).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(io_error("write_blob_temp", e));
    }

    if let Err(e) = fs::rename(&temp_path, target_path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(io_error("rename_blob_temp", e));
    }

    Ok(())
}
