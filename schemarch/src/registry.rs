use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::TableMetadata;

/// Accumulator for per-source tables during extraction.
///
/// Keys are raw struct/schema names. When two declarations share a raw name
/// the later one is stored as `Name__2`, `Name__3`, ... so nothing is dropped
/// or overwritten. Encounter order is preserved for consolidation.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    entries: Vec<(String, TableMetadata)>,
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table and return the (possibly disambiguated) key it was stored under.
    pub fn insert(&mut self, table: TableMetadata) -> String {
        let base = table.struct_name.clone();
        let mut key = base.clone();
        let mut suffix = 2;
        while self.index.contains_key(&key) {
            key = format!("{base}__{suffix}");
            suffix += 1;
        }

        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key.clone(), table));
        key
    }

    pub fn get(&self, key: &str) -> Option<&TableMetadata> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TableMetadata)> {
        self.entries.iter().map(|(key, table)| (key.as_str(), table))
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableMetadata> {
        self.entries.iter().map(|(_, table)| table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serializes as a key-sorted map so raw dumps are stable across runs.
impl Serialize for SchemaRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut sorted: Vec<&(String, TableMetadata)> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut map = serializer.serialize_map(Some(sorted.len()))?;
        for (key, table) in sorted {
            map.serialize_entry(key, table)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Provenance;

    #[test]
    fn test_insert_disambiguates_duplicate_names() {
        let mut registry = SchemaRegistry::new();
        assert_eq!(registry.insert(TableMetadata::new("User", Provenance::SourceDo)), "User");
        assert_eq!(registry.insert(TableMetadata::new("User", Provenance::SourceApi)), "User__2");
        assert_eq!(registry.insert(TableMetadata::new("User", Provenance::OpenApi)), "User__3");

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get("User__2").map(|t| t.source), Some(Provenance::SourceApi));
    }

    #[test]
    fn test_disambiguation_skips_taken_suffixes() {
        let mut registry = SchemaRegistry::new();
        registry.insert(TableMetadata::new("User__2", Provenance::SourceDo));
        registry.insert(TableMetadata::new("User", Provenance::SourceDo));
        assert_eq!(registry.insert(TableMetadata::new("User", Provenance::SourceDo)), "User__3");
    }

    #[test]
    fn test_iteration_keeps_encounter_order() {
        let mut registry = SchemaRegistry::new();
        registry.insert(TableMetadata::new("Zed", Provenance::SourceDo));
        registry.insert(TableMetadata::new("Alpha", Provenance::SourceDo));

        let keys: Vec<&str> = registry.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["Zed", "Alpha"]);
    }

    #[test]
    fn test_serializes_sorted_by_key() {
        let mut registry = SchemaRegistry::new();
        registry.insert(TableMetadata::new("Zed", Provenance::SourceDo));
        registry.insert(TableMetadata::new("Alpha", Provenance::SourceDo));

        let json = serde_json::to_string(&registry).unwrap();
        assert!(json.find("\"Alpha\"").unwrap() < json.find("\"Zed\"").unwrap());
    }
}
