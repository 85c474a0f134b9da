use backdrop_core_types::RequestId;
use thiserror::Error;

/// Result type alias using the structured error facility
pub type Result<T> = std::result::Result<T, BdError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (the CLI, tests,
/// anything rendering catalog state) can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BdErrorKind {
    // Catalog rules
    InvalidInput,
    NotFound,
    CannotDeleteDefault,
    DuplicateId,
    NotInitialized,

    // Storage backends
    BackendUnavailable,
    WriteFailed,

    // Imaging
    DecodeFailed,
    EncodeFailed,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Config,

    // Internal
    Internal,
}

impl BdErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            BdErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            BdErrorKind::NotFound => "ERR_NOT_FOUND",
            BdErrorKind::CannotDeleteDefault => "ERR_CANNOT_DELETE_DEFAULT",
            BdErrorKind::DuplicateId => "ERR_DUPLICATE_ID",
            BdErrorKind::NotInitialized => "ERR_NOT_INITIALIZED",
            BdErrorKind::BackendUnavailable => "ERR_BACKEND_UNAVAILABLE",
            BdErrorKind::WriteFailed => "ERR_WRITE_FAILED",
            BdErrorKind::DecodeFailed => "ERR_DECODE_FAILED",
            BdErrorKind::EncodeFailed => "ERR_ENCODE_FAILED",
            BdErrorKind::Io => "ERR_IO",
            BdErrorKind::Serialization => "ERR_SERIALIZATION",
            BdErrorKind::Persistence => "ERR_PERSISTENCE",
            BdErrorKind::Config => "ERR_CONFIG",
            BdErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus optional context (operation, asset id,
/// storage key, request id) for debugging.
#[derive(Debug, Clone)]
pub struct BdError {
    kind: BdErrorKind,
    op: Option<String>,
    asset_id: Option<String>,
    key: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<BdError>>,
}

impl BdError {
    /// Create a new error with the specified kind
    pub fn new(kind: BdErrorKind) -> Self {
        Self {
            kind,
            op: None,
            asset_id: None,
            key: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add asset id context
    pub fn with_asset_id(mut self, id: impl Into<String>) -> Self {
        self.asset_id = Some(id.into());
        self
    }

    /// Add storage key context
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Wrap an underlying error (e.g. the primary backend failure behind a fallback error)
    pub fn with_source(mut self, source: BdError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> BdErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn asset_id(&self) -> Option<&str> {
        self.asset_id.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&BdError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for BdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(asset_id) = &self.asset_id {
            write!(f, " (asset_id: {})", asset_id)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for BdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Catalog rule violations
///
/// Raised by [`crate::model::Catalog`] mutations; converted into [`BdError`]
/// at the crate boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No record with this id exists in the catalog
    #[error("Asset not found: {asset_id}")]
    AssetNotFound { asset_id: String },

    /// The built-in default record is permanent
    #[error("Cannot delete the default asset: {asset_id}")]
    CannotDeleteDefault { asset_id: String },

    /// A record with this id is already catalogued
    #[error("Asset already exists: {asset_id}")]
    DuplicateAssetId { asset_id: String },
}

impl From<CatalogError> for BdError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::AssetNotFound { asset_id } => BdError::new(BdErrorKind::NotFound)
                .with_asset_id(asset_id)
                .with_message(message),
            CatalogError::CannotDeleteDefault { asset_id } => {
                BdError::new(BdErrorKind::CannotDeleteDefault)
                    .with_asset_id(asset_id)
                    .with_message(message)
            }
            CatalogError::DuplicateAssetId { asset_id } => BdError::new(BdErrorKind::DuplicateId)
                .with_asset_id(asset_id)
                .with_message(message),
        }
    }
}

/// Create an IO error tagged with the failing operation
pub fn io_error(op: &str, err: std::io::Error) -> BdError {
    BdError::new(BdErrorKind::Io)
        .with_op(op.to_string())
        .with_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(BdErrorKind::NotFound.code(), "ERR_NOT_FOUND");
        assert_eq!(
            BdErrorKind::CannotDeleteDefault.code(),
            "ERR_CANNOT_DELETE_DEFAULT"
        );
        assert_eq!(
            BdErrorKind::BackendUnavailable.code(),
            "ERR_BACKEND_UNAVAILABLE"
        );
    }

    #[test]
    fn test_display_includes_context() {
        let err = BdError::new(BdErrorKind::WriteFailed)
            .with_op("put")
            .with_key("asset_1_abcdef.jpg")
            .with_message("disk full");

        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_WRITE_FAILED] in operation 'put': disk full"));
        assert!(rendered.contains("(key: asset_1_abcdef.jpg)"));
    }

    #[test]
    fn test_catalog_error_conversion() {
        let err: BdError = CatalogError::CannotDeleteDefault {
            asset_id: "default".to_string(),
        }
        .into();

        assert_eq!(err.kind(), BdErrorKind::CannotDeleteDefault);
        assert_eq!(err.asset_id(), Some("default"));
        assert!(err.message().contains("default"));
    }

    #[test]
    fn test_source_chain() {
        let primary = BdError::new(BdErrorKind::BackendUnavailable).with_message("denied");
        let err = BdError::new(BdErrorKind::Persistence).with_source(primary);

        assert_eq!(
            err.source_error().map(|e| e.kind()),
            Some(BdErrorKind::BackendUnavailable)
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
