//! Error handling for backdrop-store
//!
//! Wraps backdrop-core BdError with store-specific helpers

use backdrop_core::errors::{BdError, BdErrorKind};

pub use backdrop_core::errors::io_error;

/// Result type alias using BdError
pub type Result<T> = std::result::Result<T, BdError>;

/// A backend could not be initialized (permission denied, unreadable root, ...)
pub fn backend_unavailable(backend: &str, reason: impl std::fmt::Display) -> BdError {
    BdError::new(BdErrorKind::BackendUnavailable)
        .with_op("open_backend")
        .with_message(format!("{} backend unavailable: {}", backend, reason))
}

/// A blob write did not complete
pub fn write_failed(key: &str, reason: impl std::fmt::Display) -> BdError {
    BdError::new(BdErrorKind::WriteFailed)
        .with_op("put")
        .with_key(key)
        .with_message(reason.to_string())
}

/// A key that cannot be used as a storage locator
pub fn invalid_key(key: &str, reason: &str) -> BdError {
    BdError::new(BdErrorKind::InvalidInput)
        .with_op("validate_key")
        .with_key(key)
        .with_message(reason.to_string())
}

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> BdError {
    BdError::new(BdErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> BdError {
    BdError::new(BdErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create a settings (de)serialization error
pub fn serialization_error(op: &str, err: serde_json::Error) -> BdError {
    BdError::new(BdErrorKind::Serialization)
        .with_op(op.to_string())
        .with_message(err.to_string())
}
