use serde::{Deserialize, Serialize};

use crate::model::asset::AssetRecord;
use crate::model::catalog::Catalog;

/// The asset currently applied as the background, by key
///
/// An absent or stale key resolves to the newest catalog record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrentSelection(Option<String>);

impl CurrentSelection {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn of(key: impl Into<String>) -> Self {
        Self(Some(key.into()))
    }

    pub fn key(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Whether the stored key names a record in `catalog`
    pub fn resolves_in(&self, catalog: &Catalog) -> bool {
        self.key()
            .map(|key| catalog.find_by_key(key).is_some())
            .unwrap_or(false)
    }

    /// The record this selection points at, falling back to the newest
    pub fn resolve<'a>(&self, catalog: &'a Catalog) -> &'a AssetRecord {
        self.key()
            .and_then(|key| catalog.find_by_key(key))
            .unwrap_or_else(|| catalog.newest())
    }

    /// Pin the selection to whatever it currently resolves to
    pub fn normalized(&self, catalog: &Catalog) -> Self {
        Self::of(self.resolve(catalog).key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::with_default();
        catalog
            .prepend(AssetRecord::new(
                "100_aaaaaa",
                "asset_100_aaaaaa.jpg",
                Utc.timestamp_millis_opt(100).unwrap(),
            ))
            .unwrap();
        catalog
    }

    #[test]
    fn test_absent_selection_resolves_to_newest() {
        let catalog = catalog();
        assert_eq!(CurrentSelection::none().resolve(&catalog).id, "100_aaaaaa");
    }

    #[test]
    fn test_stale_selection_resolves_to_newest() {
        let catalog = catalog();
        let selection = CurrentSelection::of("asset_999_zzzzzz.jpg");

        assert!(!selection.resolves_in(&catalog));
        assert_eq!(selection.resolve(&catalog).id, "100_aaaaaa");
        assert_eq!(
            selection.normalized(&catalog).key(),
            Some("asset_100_aaaaaa.jpg")
        );
    }

    #[test]
    fn test_valid_selection_is_kept() {
        let catalog = catalog();
        let selection = CurrentSelection::of("default");

        assert!(selection.resolves_in(&catalog));
        assert!(selection.resolve(&catalog).is_default);
    }
}
