//! Catalog orchestration
//!
//! ## Mutation pipeline (add / delete / set current):
//! 1. Take the state lock (one mutation at a time)
//! 2. Compute the next catalog and selection on copies
//! 3. Persist the settings snapshot
//! 4. Commit the copies to memory
//! 5. Release the lock, then notify observers
//!
//! A failed step leaves the in-memory state exactly as it was.

use backdrop_core::errors::{BdError, BdErrorKind, CatalogError, Result};
use backdrop_core::imaging::{analyze, downscale, Brightness, ContrastStyle, DownscaleOptions};
use backdrop_core::keys::{generate_key, GeneratedKey};
use backdrop_core::{
    log_op_end, log_op_error, log_op_start, AssetRecord, BackdropConfig, Catalog, CatalogEvent,
    CatalogObserver, CurrentSelection, ObserverId, ObserverRegistry, SettingsSnapshot,
};
use backdrop_core_types::RequestId;
use backdrop_store::{open_backend, BackendKind, BackendSelection, JsonSettingsFile, SettingsStore};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Instant;
use tokio::sync::Mutex;

use crate::reconcile::reconcile;

const KEY_GENERATION_ATTEMPTS: usize = 5;

#[derive(Debug)]
struct CatalogState {
    catalog: Catalog,
    selection: CurrentSelection,
    /// Set once `initialize` has loaded the persisted snapshot
    loaded: bool,
}

impl CatalogState {
    /// Mutations require the persisted snapshot to be loaded
    fn ensure_loaded(&self, op: &str) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        Err(BdError::new(BdErrorKind::NotInitialized)
            .with_op(op.to_string())
            .with_message("catalog has not been initialized"))
    }
}

/// Owner of the wallpaper catalog and current selection
pub struct CatalogManager {
    backend: BackendSelection,
    settings: Arc<dyn SettingsStore>,
    imaging: DownscaleOptions,
    default_asset: Option<PathBuf>,
    state: Mutex<CatalogState>,
    observers: StdMutex<ObserverRegistry>,
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

impl CatalogManager {
    /// Build a manager over an already selected backend
    ///
    /// The catalog starts as just the default record; call
    /// [`CatalogManager::initialize`] to load persisted state. Mutations
    /// fail with `NotInitialized` until it has succeeded.
    pub fn new(
        backend: BackendSelection,
        settings: Arc<dyn SettingsStore>,
        imaging: DownscaleOptions,
        default_asset: Option<PathBuf>,
    ) -> Self {
        Self {
            backend,
            settings,
            imaging,
            default_asset,
            state: Mutex::new(CatalogState {
                catalog: Catalog::with_default(),
                selection: CurrentSelection::none(),
                loaded: false,
            }),
            observers: StdMutex::new(ObserverRegistry::new()),
        }
    }

    /// Probe the configured backend and open the settings file
    ///
    /// # Errors
    ///
    /// `BackendUnavailable` if no permitted backend could be opened.
    pub async fn open(config: &BackdropConfig) -> Result<Self> {
        let backend = open_backend(&config.storage).await?;
        let settings = Arc::new(JsonSettingsFile::new(config.storage.settings.clone()));
        Ok(Self::new(
            backend,
            settings,
            config.imaging,
            config.storage.default_asset.clone(),
        ))
    }

    // ========== Observers ==========

    fn registry(&self) -> MutexGuard<'_, ObserverRegistry> {
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register an observer; events arrive in registration order
    ///
    /// Observers run synchronously on the mutating task and must not call
    /// `subscribe`/`unsubscribe` from inside `on_event`.
    pub fn subscribe(&self, observer: impl CatalogObserver + 'static) -> ObserverId {
        self.registry().register(Box::new(observer))
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.registry().unregister(id)
    }

    fn notify(&self, events: &[CatalogEvent]) {
        let registry = self.registry();
        for event in events {
            registry.dispatch(event);
        }
    }

    // ========== Lifecycle ==========

    /// Load the persisted snapshot and reconcile it with the backend
    ///
    /// Writes the snapshot back when reconciliation changed it.
    ///
    /// # Errors
    ///
    /// `Io`/`Serialization` if the settings blob cannot be read, backend
    /// errors from enumeration, `Persistence`/`Io` if the write-back fails.
    pub async fn initialize(&self) -> Result<Vec<AssetRecord>> {
        let start = Instant::now();
        let request_id = RequestId::new();
        log_op_start!("initialize", request_id = %request_id, backend = self.backend.kind.as_str());

        let result = self.initialize_inner().await;
        match &result {
            Ok(records) => log_op_end!(
                "initialize",
                duration_ms = elapsed_ms(start),
                request_id = %request_id,
                catalog_len = records.len()
            ),
            Err(err) => log_op_error!(
                "initialize",
                err,
                duration_ms = elapsed_ms(start),
                request_id = %request_id
            ),
        }

        let records = result.map_err(|e| e.with_request_id(request_id))?;
        self.notify(&[CatalogEvent::CatalogLoaded {
            records: records.clone(),
        }]);
        Ok(records)
    }

    async fn initialize_inner(&self) -> Result<Vec<AssetRecord>> {
        let mut state = self.state.lock().await;

        let persisted = self.settings.load().await?;
        let enumerated = self.backend.store.list_keys().await?;
        let reconciled = reconcile(persisted.as_ref(), enumerated.as_deref());

        let snapshot = reconciled.snapshot();
        if persisted.as_ref() != Some(&snapshot) {
            tracing::debug!(
                catalog_len = reconciled.catalog.len(),
                "persisted snapshot out of date, writing back"
            );
            self.settings.save(&snapshot).await?;
        }

        state.catalog = reconciled.catalog;
        state.selection = reconciled.selection;
        state.loaded = true;
        Ok(state.catalog.records().to_vec())
    }

    // ========== Mutations ==========

    /// Downscale, store and catalogue a new wallpaper, then make it current
    ///
    /// # Errors
    ///
    /// `NotInitialized` before [`CatalogManager::initialize`],
    /// `InvalidInput` for empty input, `DecodeFailed`/`EncodeFailed` from the
    /// downscaler, `WriteFailed` from the backend, or the settings store's
    /// error. The catalog is unchanged on every error.
    pub async fn add_asset(&self, bytes: &[u8], extension_hint: &str) -> Result<AssetRecord> {
        let start = Instant::now();
        let request_id = RequestId::new();
        log_op_start!(
            "add_asset",
            request_id = %request_id,
            byte_len = bytes.len(),
            extension_hint = extension_hint
        );

        let result = self.add_asset_inner(bytes, extension_hint).await;
        match &result {
            Ok(record) => log_op_end!(
                "add_asset",
                duration_ms = elapsed_ms(start),
                request_id = %request_id,
                asset_id = record.id.as_str(),
                asset_key = record.key.as_str()
            ),
            Err(err) => log_op_error!(
                "add_asset",
                err,
                duration_ms = elapsed_ms(start),
                request_id = %request_id
            ),
        }

        let record = result.map_err(|e| e.with_request_id(request_id))?;
        self.notify(&[
            CatalogEvent::AssetAdded(record.clone()),
            CatalogEvent::CurrentChanged(record.clone()),
        ]);
        Ok(record)
    }

    async fn add_asset_inner(&self, bytes: &[u8], extension_hint: &str) -> Result<AssetRecord> {
        if bytes.is_empty() {
            return Err(BdError::new(BdErrorKind::InvalidInput)
                .with_op("add_asset")
                .with_message("image bytes are empty"));
        }

        let downscaled = downscale(bytes, &self.imaging)?;
        tracing::debug!(
            source_len = bytes.len(),
            stored_len = downscaled.bytes.len(),
            width = downscaled.width,
            height = downscaled.height,
            attempts = downscaled.attempts,
            "downscaled asset"
        );

        let mut state = self.state.lock().await;
        state.ensure_loaded("add_asset")?;

        let generated = unique_key(&state.catalog, extension_hint)?;
        self.backend
            .store
            .put(&generated.key, &downscaled.bytes)
            .await?;

        let record = AssetRecord::new(generated.id, generated.key, generated.created_at);
        let mut catalog = state.catalog.clone();
        catalog.prepend(record.clone())?;
        let selection = CurrentSelection::of(record.key.clone());

        if let Err(err) = self
            .settings
            .save(&SettingsSnapshot::capture(&catalog, &selection))
            .await
        {
            if let Err(cleanup) = self.backend.store.delete(&record.key).await {
                tracing::warn!(
                    asset_key = record.key.as_str(),
                    err = %cleanup,
                    "could not remove blob after failed save"
                );
            }
            return Err(err.with_asset_id(record.id.clone()));
        }

        state.catalog = catalog;
        state.selection = selection;
        Ok(record)
    }

    /// Remove a wallpaper; the default record cannot be removed
    ///
    /// The updated catalog is persisted before the bytes are deleted. If the
    /// deleted record was current, the newest remaining record becomes
    /// current.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, `CannotDeleteDefault`, `NotFound`, or the settings
    /// store's error.
    pub async fn delete_asset(&self, id: &str) -> Result<()> {
        let start = Instant::now();
        let request_id = RequestId::new();
        log_op_start!("delete_asset", request_id = %request_id, asset_id = id);

        let result = self.delete_asset_inner(id).await;
        match &result {
            Ok(_) => log_op_end!(
                "delete_asset",
                duration_ms = elapsed_ms(start),
                request_id = %request_id,
                asset_id = id
            ),
            Err(err) => log_op_error!(
                "delete_asset",
                err,
                duration_ms = elapsed_ms(start),
                request_id = %request_id,
                asset_id = id
            ),
        }

        let (removed, new_current) = result.map_err(|e| e.with_request_id(request_id))?;
        let mut events = vec![CatalogEvent::AssetDeleted(removed)];
        if let Some(record) = new_current {
            events.push(CatalogEvent::CurrentChanged(record));
        }
        self.notify(&events);
        Ok(())
    }

    async fn delete_asset_inner(&self, id: &str) -> Result<(AssetRecord, Option<AssetRecord>)> {
        let mut state = self.state.lock().await;
        state.ensure_loaded("delete_asset")?;

        let mut catalog = state.catalog.clone();
        let removed = catalog.remove(id)?;

        let was_current = state.selection.resolve(&state.catalog).id == removed.id;
        let selection = if was_current {
            CurrentSelection::of(catalog.newest().key.clone())
        } else {
            state.selection.clone()
        };

        self.settings
            .save(&SettingsSnapshot::capture(&catalog, &selection))
            .await?;

        let new_current = was_current.then(|| catalog.newest().clone());
        state.catalog = catalog;
        state.selection = selection;

        // The catalog no longer references the key; a failure here only orphans the blob
        if let Err(err) = self.backend.store.delete(&removed.key).await {
            tracing::warn!(
                asset_id = removed.id.as_str(),
                asset_key = removed.key.as_str(),
                err = %err,
                "asset bytes not deleted"
            );
        }

        Ok((removed, new_current))
    }

    /// Make an existing record the current wallpaper
    ///
    /// # Errors
    ///
    /// `NotInitialized`, `NotFound` for an unknown id, or the settings store's
    /// error.
    pub async fn set_current(&self, id: &str) -> Result<AssetRecord> {
        let start = Instant::now();
        let request_id = RequestId::new();
        log_op_start!("set_current", request_id = %request_id, asset_id = id);

        let result = self.set_current_inner(id).await;
        match &result {
            Ok(_) => log_op_end!(
                "set_current",
                duration_ms = elapsed_ms(start),
                request_id = %request_id,
                asset_id = id
            ),
            Err(err) => log_op_error!(
                "set_current",
                err,
                duration_ms = elapsed_ms(start),
                request_id = %request_id,
                asset_id = id
            ),
        }

        let record = result.map_err(|e| e.with_request_id(request_id))?;
        self.notify(&[CatalogEvent::CurrentChanged(record.clone())]);
        Ok(record)
    }

    async fn set_current_inner(&self, id: &str) -> Result<AssetRecord> {
        let mut state = self.state.lock().await;
        state.ensure_loaded("set_current")?;

        let record = state
            .catalog
            .find(id)
            .cloned()
            .ok_or_else(|| CatalogError::AssetNotFound {
                asset_id: id.to_string(),
            })?;
        let selection = CurrentSelection::of(record.key.clone());

        self.settings
            .save(&SettingsSnapshot::capture(&state.catalog, &selection))
            .await?;

        state.selection = selection;
        Ok(record)
    }

    // ========== Queries ==========

    /// Records, newest first
    pub async fn catalog(&self) -> Vec<AssetRecord> {
        self.state.lock().await.catalog.records().to_vec()
    }

    /// The record currently applied as the background
    pub async fn current(&self) -> AssetRecord {
        let state = self.state.lock().await;
        state.selection.resolve(&state.catalog).clone()
    }

    /// Backend chosen at startup
    pub fn backend(&self) -> BackendKind {
        self.backend.kind
    }

    /// Stored bytes of a catalogued asset
    ///
    /// The default record reads the bundled file named in configuration.
    /// Returns `Ok(None)` when the bytes are missing.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, backend or file read errors.
    pub async fn asset_bytes(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let record = {
            let state = self.state.lock().await;
            state
                .catalog
                .find(id)
                .cloned()
                .ok_or_else(|| CatalogError::AssetNotFound {
                    asset_id: id.to_string(),
                })?
        };

        if record.is_default {
            return self.default_asset_bytes().await;
        }
        self.backend.store.get(&record.key).await
    }

    async fn default_asset_bytes(&self) -> Result<Option<Vec<u8>>> {
        let Some(path) = &self.default_asset else {
            return Ok(None);
        };
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "default asset file missing");
                Ok(None)
            }
            Err(e) => Err(backdrop_core::errors::io_error("read_default_asset", e)),
        }
    }

    /// Brightness of the current wallpaper; neutral when it has no bytes
    ///
    /// # Errors
    ///
    /// Backend or file read errors.
    pub async fn current_brightness(&self) -> Result<Brightness> {
        let current = self.current().await;
        let brightness = match self.asset_bytes(&current.id).await? {
            Some(bytes) => analyze(&bytes),
            None => Brightness::neutral(),
        };
        tracing::debug!(
            asset_id = current.id.as_str(),
            luminance = brightness.luminance,
            decoded = brightness.decoded,
            "classified current asset"
        );
        Ok(brightness)
    }

    /// Foreground style contrasting with the current wallpaper
    ///
    /// # Errors
    ///
    /// See [`CatalogManager::current_brightness`].
    pub async fn current_contrast(&self) -> Result<ContrastStyle> {
        Ok(ContrastStyle::for_brightness(&self.current_brightness().await?))
    }
}

impl std::fmt::Debug for CatalogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogManager")
            .field("backend", &self.backend.kind)
            .field("default_asset", &self.default_asset)
            .finish_non_exhaustive()
    }
}

/// Generate a key whose id is not already catalogued
fn unique_key(catalog: &Catalog, extension_hint: &str) -> Result<GeneratedKey> {
    for _ in 0..KEY_GENERATION_ATTEMPTS {
        let generated = generate_key(extension_hint);
        if catalog.find(&generated.id).is_none() {
            return Ok(generated);
        }
    }
    Err(BdError::new(BdErrorKind::DuplicateId)
        .with_op("generate_key")
        .with_message("could not generate an unused asset id"))
}
