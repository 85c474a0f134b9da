use std::collections::HashSet;

use crate::errors::CatalogError;
use crate::model::asset::AssetRecord;

/// Ordered collection of asset records, newest first
///
/// Invariants held by every constructor and mutation:
/// - exactly one record has `is_default = true`, and it cannot be removed
/// - no two records share an `id`
/// - records are sorted by `created_at` descending (ties keep insertion order)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    records: Vec<AssetRecord>,
}

impl Catalog {
    /// A catalog holding only the built-in default record
    pub fn with_default() -> Self {
        Self {
            records: vec![AssetRecord::default_record()],
        }
    }

    /// Build a catalog from untrusted records (settings blob, backend scan)
    ///
    /// Keeps the first occurrence of each id, keeps only the first record
    /// flagged default (later ones are dropped), synthesizes the default if
    /// none is present, then restores newest-first order.
    pub fn from_records(records: impl IntoIterator<Item = AssetRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut has_default = false;
        let mut kept = Vec::new();

        for record in records {
            if record.is_default {
                if has_default {
                    continue;
                }
                has_default = true;
            }
            if seen.insert(record.id.clone()) {
                kept.push(record);
            } else if record.is_default {
                has_default = kept.iter().any(|r| r.is_default);
            }
        }

        if !has_default {
            let default = AssetRecord::default_record();
            kept.retain(|r| r.id != default.id);
            kept.push(default);
        }

        // Stable sort: equal timestamps keep their incoming order
        kept.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { records: kept }
    }

    /// Insert a new record at its newest-first position
    ///
    /// A record stamped at or after every existing record lands at the front;
    /// an older one (clock moved backwards) lands after all newer records.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAssetId` if the id is already catalogued.
    pub fn prepend(&mut self, record: AssetRecord) -> Result<(), CatalogError> {
        if self.find(&record.id).is_some() {
            return Err(CatalogError::DuplicateAssetId {
                asset_id: record.id,
            });
        }
        let index = self
            .records
            .partition_point(|r| r.created_at > record.created_at);
        self.records.insert(index, record);
        Ok(())
    }

    /// Remove a record by id and return it
    ///
    /// # Errors
    ///
    /// Returns `CannotDeleteDefault` for the built-in record and
    /// `AssetNotFound` for unknown ids. The catalog is untouched on error.
    pub fn remove(&mut self, id: &str) -> Result<AssetRecord, CatalogError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| CatalogError::AssetNotFound {
                asset_id: id.to_string(),
            })?;

        if self.records[index].is_default {
            return Err(CatalogError::CannotDeleteDefault {
                asset_id: id.to_string(),
            });
        }

        Ok(self.records.remove(index))
    }

    pub fn find(&self, id: &str) -> Option<&AssetRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn find_by_key(&self, key: &str) -> Option<&AssetRecord> {
        self.records.iter().find(|r| r.key == key)
    }

    /// The newest record (the default when nothing else is catalogued)
    pub fn newest(&self) -> &AssetRecord {
        // Non-empty by construction
        &self.records[0]
    }

    pub fn default_record(&self) -> &AssetRecord {
        self.records
            .iter()
            .find(|r| r.is_default)
            .unwrap_or_else(|| self.newest())
    }

    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::with_default()
    }
}
