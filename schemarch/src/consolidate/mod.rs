//! Consolidation of per-source tables into one record per logical entity.

mod merge;
mod stabilize;

use std::collections::{BTreeMap, BTreeSet};

pub use merge::{column_key, merge_column, merge_columns, merge_constraints, merge_operations, merge_relations, merge_table};
pub use stabilize::{sort_entities, stabilize_table};

use crate::normalize::normalize_entity_name;
use crate::registry::SchemaRegistry;
use crate::types::{ConsolidatedSchema, Provenance, TableMetadata};

/// Group registry entries by normalized name and merge each group.
///
/// Entries are visited in encounter order: the first member of a group is
/// the base record and later members are merged into it. Every resulting
/// record is stabilized, so the output does not depend on input ordering
/// beyond the merge order itself.
///
/// An OpenAPI schema named exactly like its entity gives the entity its
/// display name, whatever other OpenAPI schemas merged into it.
pub fn consolidate(registry: &SchemaRegistry, generated_by: &str) -> ConsolidatedSchema {
    let mut entities: BTreeMap<String, TableMetadata> = BTreeMap::new();
    let mut canonical_names: BTreeSet<String> = BTreeSet::new();

    for table in registry.tables() {
        let key = if table.normalized_name.is_empty() {
            normalize_entity_name(&table.struct_name)
        } else {
            table.normalized_name.clone()
        };

        if table.source == Provenance::OpenApi && table.struct_name == key {
            canonical_names.insert(key.clone());
        }

        match entities.get_mut(&key) {
            Some(existing) => merge_table(existing, table),
            None => {
                let mut base = table.clone();
                base.normalized_name = key.clone();
                entities.insert(key, base);
            }
        }
    }

    for name in &canonical_names {
        if let Some(table) = entities.get_mut(name) {
            table.struct_name = name.clone();
        }
    }

    for table in entities.values_mut() {
        stabilize_table(table);
    }

    let mut entity_list: Vec<TableMetadata> = entities.values().cloned().collect();
    sort_entities(&mut entity_list);

    log::debug!("consolidated {} table(s) into {} entit(ies)", registry.len(), entity_list.len());

    ConsolidatedSchema {
        entities,
        entity_list,
        generated_by: generated_by.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnInfo;

    fn table(name: &str, source: Provenance, columns: &[(&str, &str)]) -> TableMetadata {
        let mut table = TableMetadata::new(name, source);
        for (column, type_name) in columns {
            table.columns.push(ColumnInfo::new(*column, None, *type_name, source));
        }
        table
    }

    #[test]
    fn test_consolidate_groups_by_normalized_name() {
        let mut registry = SchemaRegistry::new();
        registry.insert(table("UserCreateReq", Provenance::SourceApi, &[("passport", "string")]));
        registry.insert(table("User", Provenance::SourceDo, &[("id", "int64"), ("passport", "string")]));
        registry.insert(table("Role", Provenance::SourceDo, &[("name", "string")]));

        let schema = consolidate(&registry, "schemarch");

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.generated_by, "schemarch");

        let names: Vec<&str> = schema.entity_list.iter().map(|t| t.normalized_name.as_str()).collect();
        assert_eq!(names, vec!["Role", "User"]);

        let user = schema.get("User").unwrap();
        assert_eq!(user.source, Provenance::Merged);
        assert_eq!(user.struct_name, "UserCreateReq");
        let columns: Vec<&str> = user.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, vec!["id", "passport"]);

        assert_eq!(schema.get("Role").unwrap().source, Provenance::SourceDo);
    }

    #[test]
    fn test_consolidate_recomputes_missing_normalized_name() {
        let mut registry = SchemaRegistry::new();
        let mut orphan = table("OrderReq", Provenance::SourceApi, &[("total", "float64")]);
        orphan.normalized_name.clear();
        registry.insert(orphan);

        let schema = consolidate(&registry, "schemarch");
        assert_eq!(schema.get("Order").unwrap().normalized_name, "Order");
    }

    #[test]
    fn test_display_name_prefers_openapi_names() {
        let mut registry = SchemaRegistry::new();
        registry.insert(table("User", Provenance::SourceDo, &[("id", "int64")]));
        registry.insert(table("CreateUserReq", Provenance::OpenApi, &[("name", "string")]));
        registry.insert(table("Order", Provenance::SourceDo, &[("id", "int64")]));
        registry.insert(table("OrderRes", Provenance::OpenApi, &[("id", "int64")]));
        registry.insert(table("Order", Provenance::OpenApi, &[("total", "float64")]));
        registry.insert(table("OrderListRes", Provenance::OpenApi, &[("id", "int64")]));

        let schema = consolidate(&registry, "schemarch");
        assert_eq!(schema.get("User").unwrap().struct_name, "CreateUserReq");
        assert_eq!(schema.get("Order").unwrap().struct_name, "Order");
    }

    #[test]
    fn test_entities_and_list_agree() {
        let mut registry = SchemaRegistry::new();
        registry.insert(table("B", Provenance::OpenApi, &[("x", "string")]));
        registry.insert(table("A", Provenance::OpenApi, &[("y", "string")]));

        let schema = consolidate(&registry, "schemarch");
        let from_map: Vec<&TableMetadata> = schema.entities.values().collect();
        let from_list: Vec<&TableMetadata> = schema.entity_list.iter().collect();
        assert_eq!(from_map, from_list);
    }
}
