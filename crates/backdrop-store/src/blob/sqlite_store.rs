//! Embedded-database asset store
//!
//! One row per key in `asset_blobs`. rusqlite is synchronous, so every
//! statement runs on the blocking pool while the caller's task suspends.

use async_trait::async_trait;
use backdrop_core::errors::{BdError, BdErrorKind};
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::blob::{validate_key, AssetStore, BackendKind};
use crate::db;
use crate::errors::{backend_unavailable, from_rusqlite, io_error, write_failed, Result};
use crate::migrations::apply_migrations;

/// SQLite-backed asset store
pub struct SqliteAssetStore {
    conn: Arc<Mutex<Connection>>,
}

fn join_error(op: &str, err: tokio::task::JoinError) -> BdError {
    BdError::new(BdErrorKind::Internal)
        .with_op(op.to_string())
        .with_message(format!("blocking task failed: {}", err))
}

fn open_file(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| backend_unavailable("embedded", io_error("create_db_dir", e)))?;
    }
    db::open(path).map_err(|e| backend_unavailable("embedded", format!("{}: {}", path.display(), e)))
}

impl SqliteAssetStore {
    /// Open (creating if needed) the database file and apply migrations
    ///
    /// # Errors
    ///
    /// `BackendUnavailable` if the file cannot be opened or migrated.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || Self::from_connection(open_file(&path)?))
            .await
            .map_err(|e| join_error("open_backend", e))?
    }

    /// In-memory database, for tests
    ///
    /// # Errors
    ///
    /// `BackendUnavailable` if migrations fail.
    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory().map_err(|e| backend_unavailable("embedded", e))?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        db::configure(&conn).map_err(|e| backend_unavailable("embedded", e))?;
        apply_migrations(&mut conn).map_err(|e| backend_unavailable("embedded", e))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, op: &str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f(&guard)
        })
        .await
        .map_err(|e| join_error(op, e))?
    }
}

#[async_trait]
impl AssetStore for SqliteAssetStore {
    fn kind(&self) -> BackendKind {
        BackendKind::EmbeddedDb
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        validate_key(key)?;
        let stored_at = chrono::Utc::now().timestamp_millis();
        let key = key.to_string();
        let bytes = bytes.to_vec();
        self.with_conn("put", move |conn| {
            conn.execute(
                "INSERT INTO asset_blobs (key, data, byte_len, stored_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(key) DO UPDATE SET
                    data = excluded.data,
                    byte_len = excluded.byte_len,
                    stored_at = excluded.stored_at",
                rusqlite::params![key, bytes, bytes.len() as i64, stored_at],
            )
            .map_err(|e| write_failed(&key, &e))?;
            Ok(())
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        let key = key.to_string();
        self.with_conn("get", move |conn| {
            conn.query_row(
                "SELECT data FROM asset_blobs WHERE key = ?1",
                [&key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| from_rusqlite(e).with_op("get").with_key(&key))
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let key = key.to_string();
        self.with_conn("delete", move |conn| {
            conn.execute("DELETE FROM asset_blobs WHERE key = ?1", [&key])
                .map_err(|e| from_rusqlite(e).with_op("delete").with_key(&key))?;
            Ok(())
        })
        .await
    }

    async fn list_keys(&self) -> Result<Option<Vec<String>>> {
        Ok(None)
    }
}

impl std::fmt::Debug for SqliteAssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteAssetStore").finish_non_exhaustive()
    }
}
