use serde::{Deserialize, Serialize};

use crate::model::asset::AssetRecord;
use crate::model::catalog::Catalog;
use crate::model::selection::CurrentSelection;

/// Persisted mirror of the catalog and current selection
///
/// This is the whole settings blob: `{"catalog": [...], "currentSelectionKey": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    #[serde(default)]
    pub catalog: Vec<AssetRecord>,
    #[serde(default)]
    pub current_selection_key: Option<String>,
}

impl SettingsSnapshot {
    pub fn capture(catalog: &Catalog, selection: &CurrentSelection) -> Self {
        Self {
            catalog: catalog.records().to_vec(),
            current_selection_key: selection.key().map(str::to_string),
        }
    }

    pub fn selection(&self) -> CurrentSelection {
        match &self.current_selection_key {
            Some(key) => CurrentSelection::of(key.clone()),
            None => CurrentSelection::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_field_names() {
        let snapshot = SettingsSnapshot::capture(
            &Catalog::with_default(),
            &CurrentSelection::of("default"),
        );
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["currentSelectionKey"], "default");
        assert_eq!(json["catalog"][0]["isDefault"], true);
    }

    #[test]
    fn test_missing_fields_default() {
        let snapshot: SettingsSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.catalog.is_empty());
        assert_eq!(snapshot.selection(), CurrentSelection::none());
    }
}
