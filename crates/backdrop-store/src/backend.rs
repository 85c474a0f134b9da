//! Startup capability probe
//!
//! Chooses the asset backend once; the returned [`BackendSelection`] routes
//! every operation to that backend for the rest of the process.

use backdrop_core::config::{BackendPreference, StorageConfig};
use backdrop_core::{log_op_end, log_op_error, log_op_start, BdError};
use std::sync::Arc;
use std::time::Instant;

use crate::blob::{AssetStore, BackendKind, FsAssetStore, SqliteAssetStore};
use crate::errors::Result;

/// The backend chosen at startup
#[derive(Clone)]
pub struct BackendSelection {
    pub kind: BackendKind,
    pub store: Arc<dyn AssetStore>,
}

impl BackendSelection {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self {
            kind: store.kind(),
            store,
        }
    }
}

impl std::fmt::Debug for BackendSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSelection")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

async fn open_kind(kind: BackendKind, config: &StorageConfig) -> Result<Arc<dyn AssetStore>> {
    match kind {
        BackendKind::FileBacked => Ok(Arc::new(FsAssetStore::open(&config.root).await?)),
        BackendKind::EmbeddedDb => Ok(Arc::new(SqliteAssetStore::open(&config.database).await?)),
    }
}

fn candidates(preference: BackendPreference) -> &'static [BackendKind] {
    match preference {
        BackendPreference::Auto => &[BackendKind::FileBacked, BackendKind::EmbeddedDb],
        BackendPreference::File => &[BackendKind::FileBacked],
        BackendPreference::Embedded => &[BackendKind::EmbeddedDb],
    }
}

/// Open the preferred backend, falling back in `auto` mode
///
/// # Errors
///
/// Returns the last candidate's error (with the earlier failure attached as
/// its source) when no backend can be opened.
pub async fn open_backend(config: &StorageConfig) -> Result<BackendSelection> {
    let start = Instant::now();
    log_op_start!("open_backend", preference = ?config.backend);

    let mut last_err: Option<BdError> = None;
    for &kind in candidates(config.backend) {
        match open_kind(kind, config).await {
            Ok(store) => {
                log_op_end!(
                    "open_backend",
                    duration_ms = start.elapsed().as_millis() as u64,
                    backend = kind.as_str()
                );
                return Ok(BackendSelection { kind, store });
            }
            Err(err) => {
                tracing::warn!(
                    op = "open_backend",
                    backend = kind.as_str(),
                    err_code = err.code(),
                    err = %err,
                    "asset backend unavailable"
                );
                last_err = Some(match last_err.take() {
                    Some(previous) => err.with_source(previous),
                    None => err,
                });
            }
        }
    }

    let err = last_err.unwrap_or_else(|| {
        crate::errors::backend_unavailable("any", "no backend candidates")
    });
    log_op_error!(
        "open_backend",
        err,
        duration_ms = start.elapsed().as_millis() as u64
    );
    Err(err)
}
