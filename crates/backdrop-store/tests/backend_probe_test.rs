// Integration tests for startup backend selection

use backdrop_core::config::{BackendPreference, StorageConfig};
use backdrop_core::logging_facility::test_capture::init_test_capture;
use backdrop_core::BdErrorKind;
use backdrop_store::{open_backend, BackendKind};
use tempfile::TempDir;

fn storage_in(dir: &TempDir, backend: BackendPreference) -> StorageConfig {
    StorageConfig {
        root: dir.path().join("root"),
        database: dir.path().join("assets.db"),
        settings: dir.path().join("settings.json"),
        backend,
        default_asset: None,
    }
}

/// A root that cannot become a directory: its parent is a regular file
fn unusable_root(dir: &TempDir) -> std::path::PathBuf {
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file").unwrap();
    blocker.join("root")
}

#[tokio::test]
async fn test_auto_prefers_file_backend() {
    let dir = TempDir::new().unwrap();

    let selection = open_backend(&storage_in(&dir, BackendPreference::Auto))
        .await
        .unwrap();

    assert_eq!(selection.kind, BackendKind::FileBacked);
    assert_eq!(selection.store.kind(), BackendKind::FileBacked);
    assert!(dir.path().join("root").join("wallpapers").is_dir());
}

#[tokio::test]
async fn test_auto_falls_back_to_embedded_when_root_unusable() {
    // Given: A file root that cannot be created
    let capture = init_test_capture();
    let dir = TempDir::new().unwrap();
    let mut config = storage_in(&dir, BackendPreference::Auto);
    config.root = unusable_root(&dir);
    let marker = dir.path().display().to_string();

    // When: The backend is probed
    let selection = open_backend(&config).await.unwrap();

    // Then: The embedded store is chosen and serves reads and writes
    assert_eq!(selection.kind, BackendKind::EmbeddedDb);
    selection.store.put("asset_1_abcdef.jpg", b"x").await.unwrap();
    assert_eq!(
        selection.store.get("asset_1_abcdef.jpg").await.unwrap(),
        Some(b"x".to_vec())
    );

    // And: The file backend failure was logged at warn
    let warnings: Vec<_> = capture
        .events_for_op("open_backend")
        .into_iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .filter(|e| e.fields.get("err").is_some_and(|err| err.contains(&marker)))
        .collect();
    assert_eq!(warnings.len(), 1, "expected one fallback warning");
    assert_eq!(
        warnings[0].fields.get("err_code").map(String::as_str),
        Some("ERR_BACKEND_UNAVAILABLE")
    );
    assert_eq!(
        warnings[0].fields.get("backend").map(String::as_str),
        Some("file-backed")
    );
}

#[tokio::test]
async fn test_forced_file_backend_does_not_fall_back() {
    let dir = TempDir::new().unwrap();
    let mut config = storage_in(&dir, BackendPreference::File);
    config.root = unusable_root(&dir);

    let err = open_backend(&config).await.unwrap_err();

    assert_eq!(err.kind(), BdErrorKind::BackendUnavailable);
    assert!(!dir.path().join("assets.db").exists());
}

#[tokio::test]
async fn test_forced_embedded_backend() {
    let dir = TempDir::new().unwrap();

    let selection = open_backend(&storage_in(&dir, BackendPreference::Embedded))
        .await
        .unwrap();

    assert_eq!(selection.kind, BackendKind::EmbeddedDb);
    assert!(!dir.path().join("root").exists());
}
