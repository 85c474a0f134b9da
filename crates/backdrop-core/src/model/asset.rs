use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::ParsedKey;

/// Id of the built-in wallpaper record
pub const DEFAULT_ASSET_ID: &str = "default";

/// Key of the built-in wallpaper record; never present in a storage backend
pub const DEFAULT_ASSET_KEY: &str = "default";

/// Metadata for one wallpaper asset
///
/// `key` locates the bytes in the selected storage backend. Serialized with
/// camelCase names so the settings blob reads `isDefault` / `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    /// Unique identifier (`<millis>_<random6>` for user assets)
    pub id: String,

    /// Storage-backend locator
    pub key: String,

    /// Marks the permanent built-in wallpaper
    pub is_default: bool,

    pub created_at: DateTime<Utc>,
}

impl AssetRecord {
    /// Create a record for a user-supplied asset
    pub fn new(id: impl Into<String>, key: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            is_default: false,
            created_at,
        }
    }

    /// The built-in default record
    ///
    /// Timestamped at the Unix epoch so it always sorts after user assets.
    pub fn default_record() -> Self {
        Self {
            id: DEFAULT_ASSET_ID.to_string(),
            key: DEFAULT_ASSET_KEY.to_string(),
            is_default: true,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Rebuild a record from a key found by enumerating a backend
    pub fn from_parsed_key(parsed: &ParsedKey) -> Self {
        Self::new(parsed.id.clone(), parsed.key.clone(), parsed.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_record_shape() {
        let record = AssetRecord::default_record();
        assert!(record.is_default);
        assert_eq!(record.id, DEFAULT_ASSET_ID);
        assert_eq!(record.key, DEFAULT_ASSET_KEY);
        assert_eq!(record.created_at.timestamp(), 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let record = AssetRecord::new(
            "1700000000000_abc123",
            "asset_1700000000000_abc123.png",
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        );
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["isDefault"], false);
        assert_eq!(json["key"], "asset_1700000000000_abc123.png");
        assert!(json["createdAt"].as_str().unwrap().starts_with("2023-11-14T"));
        assert!(json.get("is_default").is_none());
    }
}
