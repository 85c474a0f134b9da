//! Startup reconciliation of the persisted snapshot with backend contents
//!
//! When the backend can enumerate its keys, enumeration decides membership.
//! Records the snapshot already knows keep their id and timestamp; keys the
//! snapshot has never seen are rebuilt from the key itself. Without
//! enumeration the snapshot is taken as-is.

use backdrop_core::keys::parse_key;
use backdrop_core::{AssetRecord, Catalog, CurrentSelection, SettingsSnapshot};

/// Catalog and selection after reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub catalog: Catalog,
    pub selection: CurrentSelection,
}

impl Reconciled {
    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot::capture(&self.catalog, &self.selection)
    }
}

pub fn reconcile(snapshot: Option<&SettingsSnapshot>, enumerated: Option<&[String]>) -> Reconciled {
    let persisted: &[AssetRecord] = snapshot.map(|s| s.catalog.as_slice()).unwrap_or_default();

    let records: Vec<AssetRecord> = match enumerated {
        None => persisted.to_vec(),
        Some(keys) => {
            let defaults = persisted.iter().filter(|r| r.is_default).cloned();
            let stored = keys.iter().filter_map(|key| {
                persisted
                    .iter()
                    .find(|r| !r.is_default && &r.key == key)
                    .cloned()
                    .or_else(|| parse_key(key).map(|parsed| AssetRecord::from_parsed_key(&parsed)))
            });
            defaults.chain(stored).collect()
        }
    };

    let catalog = Catalog::from_records(records);
    let selection = snapshot
        .map(SettingsSnapshot::selection)
        .unwrap_or_default()
        .normalized(&catalog);

    Reconciled { catalog, selection }
}
