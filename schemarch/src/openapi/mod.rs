//! API-specification extraction from OpenAPI 3 documents (JSON or YAML).
//!
//! Every component schema becomes a table. Operations are associated with
//! tables by normalized entity name.

mod document;
mod operations;
mod resolver;

use std::collections::HashMap;

pub use document::{
    Components, MediaType, OpenApiDocument, Operation, PathItem, RequestBody, Response, Schema, SchemaType, load_document,
    ref_name,
};
pub use operations::{
    entity_from_path, extract_operations, infer_entity_name, operation_info, pick_media_schema, request_schema_name,
    response_schema_name, schema_ref_or_item_ref,
};
pub use resolver::{CollectedObject, TypeLabel, collect_object, constraints_for, table_from_schema, type_label};

use crate::normalize::normalize_entity_name;
use crate::types::{OperationInfo, TableMetadata};

/// Turn a parsed document into tables, in component name order.
///
/// Operations whose inferred entity matches no component schema are dropped.
pub fn extract_document(doc: &OpenApiDocument) -> Vec<TableMetadata> {
    let mut tables: Vec<TableMetadata> = doc
        .components
        .schemas
        .iter()
        .map(|(name, schema)| table_from_schema(doc, name, schema))
        .collect();

    let mut by_entity: HashMap<String, Vec<OperationInfo>> = HashMap::new();
    for operation in extract_operations(doc) {
        let raw = infer_entity_name(&operation);
        if raw.trim().is_empty() {
            log::debug!("{} {}: no entity could be inferred", operation.method, operation.path);
            continue;
        }
        by_entity.entry(normalize_entity_name(&raw)).or_default().push(operation);
    }

    for table in &mut tables {
        if let Some(operations) = by_entity.get(&table.normalized_name) {
            table.operations.extend(operations.iter().cloned());
        }
    }

    log::debug!("openapi: {} component schema(s), {} entity key(s) with operations", tables.len(), by_entity.len());

    tables
}
