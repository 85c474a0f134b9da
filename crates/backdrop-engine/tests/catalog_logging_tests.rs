// Structured log events emitted by CatalogManager operations
// Runs in its own binary so the capture subscriber is the global default

use backdrop_core::imaging::DownscaleOptions;
use backdrop_core::logging_facility::test_capture::{init_test_capture, CapturedEvent, TestCapture};
use backdrop_core::BdErrorKind;
use backdrop_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use backdrop_engine::CatalogManager;
use backdrop_store::{BackendSelection, MemorySettings, SqliteAssetStore};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([40, 80, 120]));
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

async fn initialized_manager() -> CatalogManager {
    let manager = CatalogManager::new(
        BackendSelection::new(Arc::new(SqliteAssetStore::open_in_memory().unwrap())),
        Arc::new(MemorySettings::new()),
        DownscaleOptions::default(),
        None,
    );
    manager.initialize().await.unwrap();
    manager
}

/// Events for `op` carrying the given request id, in emission order
fn events_for_request(capture: &TestCapture, op: &str, request_id: &str) -> Vec<CapturedEvent> {
    capture
        .events_for_op(op)
        .into_iter()
        .filter(|e| e.fields.get("request_id").map(String::as_str) == Some(request_id))
        .collect()
}

#[tokio::test]
async fn test_add_asset_logs_start_and_end() {
    let capture = init_test_capture();
    let manager = initialized_manager().await;

    let record = manager.add_asset(&png(24, 16), "png").await.unwrap();

    // The end event names the stored asset; its request id ties it to the start
    let end = capture
        .events_for_op("add_asset")
        .into_iter()
        .find(|e| {
            e.event.as_deref() == Some(EVENT_END)
                && e.fields.get("asset_id") == Some(&record.id)
        })
        .expect("end event for the added asset");
    let request_id = end.fields.get("request_id").cloned().unwrap();
    assert!(end.fields.contains_key("duration_ms"));

    let events = events_for_request(&capture, "add_asset", &request_id);
    let kinds: Vec<_> = events.iter().map(|e| e.event.as_deref()).collect();
    assert_eq!(kinds, vec![Some(EVENT_START), Some(EVENT_END)]);
    assert_eq!(events[0].level, tracing::Level::INFO);
}

#[tokio::test]
async fn test_delete_default_logs_end_error() {
    let capture = init_test_capture();
    let manager = initialized_manager().await;

    let err = manager.delete_asset("default").await.unwrap_err();
    assert_eq!(err.kind(), BdErrorKind::CannotDeleteDefault);
    let request_id = err.request_id().unwrap().to_string();

    let events = events_for_request(&capture, "delete_asset", &request_id);
    let kinds: Vec<_> = events.iter().map(|e| e.event.as_deref()).collect();
    assert_eq!(kinds, vec![Some(EVENT_START), Some(EVENT_END_ERROR)]);

    let failure = &events[1];
    assert_eq!(failure.level, tracing::Level::ERROR);
    assert_eq!(
        failure.fields.get("err_code").map(String::as_str),
        Some("ERR_CANNOT_DELETE_DEFAULT")
    );
    assert_eq!(
        failure.fields.get("asset_id").map(String::as_str),
        Some("default")
    );
}

#[tokio::test]
async fn test_set_current_unknown_id_logs_not_found() {
    let capture = init_test_capture();
    let manager = initialized_manager().await;

    let err = manager.set_current("1_missing").await.unwrap_err();
    let request_id = err.request_id().unwrap().to_string();

    let events = events_for_request(&capture, "set_current", &request_id);
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(
        events[1].fields.get("err_code").map(String::as_str),
        Some("ERR_NOT_FOUND")
    );
}
