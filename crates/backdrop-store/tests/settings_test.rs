// Integration tests for the JSON settings blob

use backdrop_core::{AssetRecord, BdErrorKind, Catalog, CurrentSelection, SettingsSnapshot};
use backdrop_store::{JsonSettingsFile, SettingsStore};
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

fn sample_snapshot() -> SettingsSnapshot {
    let mut catalog = Catalog::with_default();
    catalog
        .prepend(AssetRecord::new(
            "1700000000000_abc123",
            "asset_1700000000000_abc123.jpg",
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        ))
        .unwrap();
    SettingsSnapshot::capture(
        &catalog,
        &CurrentSelection::of("asset_1700000000000_abc123.jpg"),
    )
}

#[tokio::test]
async fn test_missing_file_loads_none() {
    let dir = TempDir::new().unwrap();
    let settings = JsonSettingsFile::new(dir.path().join("settings.json"));

    assert_eq!(settings.load().await.unwrap(), None);
}

#[tokio::test]
async fn test_save_then_load() {
    // Given: A snapshot saved into a not-yet-existing directory
    let dir = TempDir::new().unwrap();
    let settings = JsonSettingsFile::new(dir.path().join("state").join("settings.json"));
    let snapshot = sample_snapshot();

    // When: It is saved and loaded again
    settings.save(&snapshot).await.unwrap();
    let loaded = settings.load().await.unwrap();

    // Then: The same snapshot comes back
    assert_eq!(loaded, Some(snapshot));
}

#[tokio::test]
async fn test_blob_uses_camel_case_fields() {
    let dir = TempDir::new().unwrap();
    let settings = JsonSettingsFile::new(dir.path().join("settings.json"));
    settings.save(&sample_snapshot()).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(settings.path()).unwrap()).unwrap();

    assert_eq!(raw["currentSelectionKey"], "asset_1700000000000_abc123.jpg");
    assert_eq!(raw["catalog"][0]["id"], "1700000000000_abc123");
    assert_eq!(raw["catalog"][1]["isDefault"], true);
    assert!(raw["catalog"][0]["createdAt"].is_string());
}

#[tokio::test]
async fn test_malformed_file_is_serialization_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let err = JsonSettingsFile::new(&path).load().await.unwrap_err();

    assert_eq!(err.kind(), BdErrorKind::Serialization);
}
