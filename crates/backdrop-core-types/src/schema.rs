//! Canonical schema constants for structured logging
//!
//! These keep field names identical across the store, engine and CLI so log
//! pipelines (and the test capture layer) can filter on them.

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Entity identifiers
pub const FIELD_ASSET_ID: &str = "asset_id";
pub const FIELD_ASSET_KEY: &str = "asset_key";
pub const FIELD_BACKEND: &str = "backend";

// Sizes
pub const FIELD_BYTE_LEN: &str = "byte_len";
pub const FIELD_CATALOG_LEN: &str = "catalog_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_field_keys_are_unique() {
        let keys = [
            FIELD_COMPONENT,
            FIELD_OP,
            FIELD_EVENT,
            FIELD_DURATION_MS,
            FIELD_REQUEST_ID,
            FIELD_ASSET_ID,
            FIELD_ASSET_KEY,
            FIELD_BACKEND,
            FIELD_BYTE_LEN,
            FIELD_CATALOG_LEN,
            FIELD_ERR_KIND,
            FIELD_ERR_CODE,
        ];
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }
}
