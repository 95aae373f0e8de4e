//! Data model shared by both extractors and the consolidator.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel type label used when a field's type cannot be resolved.
pub const UNKNOWN_TYPE: &str = "Unknown";

/// Default generator tag written into consolidated documents.
pub const DEFAULT_GENERATED_BY: &str = "schemarch";

/// Which extractor produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Provenance {
    /// Data-access struct found under a `/model/do` path.
    #[serde(rename = "rust:do")]
    SourceDo,
    /// Request/response struct found under an `/api` path.
    #[serde(rename = "rust:api")]
    SourceApi,
    /// Struct found anywhere else.
    #[serde(rename = "rust")]
    Source,
    /// Component schema read from an OpenAPI document.
    #[serde(rename = "openapi")]
    OpenApi,
    /// Record produced by consolidating two or more sources.
    #[serde(rename = "merged")]
    Merged,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::SourceDo => "rust:do",
            Provenance::SourceApi => "rust:api",
            Provenance::Source => "rust",
            Provenance::OpenApi => "openapi",
            Provenance::Merged => "merged",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-usable validation and shape constraints for a single column.
///
/// An instance where nothing is set is never stored: use
/// [`FieldConstraints::normalized`] before attaching it to a column so that
/// merging stays idempotent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConstraints {
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pattern: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl FieldConstraints {
    /// True when no constraint is actually set.
    pub fn is_empty(&self) -> bool {
        !self.required
            && !self.nullable
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.minimum.is_none()
            && self.maximum.is_none()
            && self.pattern.is_empty()
            && self.format.is_empty()
            && self.enum_values.is_empty()
    }

    /// Collapse an all-default instance to `None`.
    pub fn normalized(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

/// A non-relational field of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Field name as declared (Rust field or OpenAPI property name)
    pub name: String,

    /// Wire name; falls back to `name` when the source declares none
    pub json_name: String,

    /// Coarse type label (`string`, `int64`, `[]Role`, `entity.User`, `Unknown`, ...)
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub validation: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Extra free-form hints (placeholders and the like)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub additional: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<FieldConstraints>,

    /// Component schema this field refers to, if any
    #[serde(rename = "ref", default, skip_serializing_if = "String::is_empty")]
    pub ref_name: String,

    #[serde(default)]
    pub is_array: bool,

    pub source: Provenance,
}

impl ColumnInfo {
    /// Create a column, applying the wire-name and type-label fallbacks.
    pub fn new(name: impl Into<String>, json_name: Option<String>, type_name: impl Into<String>, source: Provenance) -> Self {
        let name = name.into();
        let json_name = json_name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| name.clone());
        let mut type_name = type_name.into();
        if type_name.trim().is_empty() {
            type_name = UNKNOWN_TYPE.to_string();
        }
        Self {
            name,
            json_name,
            type_name,
            validation: String::new(),
            description: String::new(),
            additional: String::new(),
            constraints: None,
            ref_name: String::new(),
            is_array: false,
            source,
        }
    }

    /// The name used for identity and ordering: wire name, else raw name.
    pub fn wire_name(&self) -> &str {
        if self.json_name.is_empty() { &self.name } else { &self.json_name }
    }
}

/// A statically inferred association between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationNode {
    /// Field that holds the relation (e.g., "user_detail")
    pub field_name: String,

    /// Related type as declared (e.g., "UserDetail" or "entity.UserDetail")
    pub target_struct: String,

    /// True for one-to-many, false for one-to-one
    pub is_collection: bool,

    /// Key on the target side (the `uid` in `uid=id`)
    pub target_key: String,

    /// Key on this side (the `id` in `uid=id`)
    pub source_key: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub validation: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl RelationNode {
    /// Case-insensitive identity used for deduplication.
    pub fn identity_key(&self) -> String {
        [
            self.field_name.as_str(),
            self.target_struct.as_str(),
            self.target_key.as_str(),
            self.source_key.as_str(),
        ]
        .iter()
        .map(|part| part.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join("|")
    }
}

/// An API operation associated with an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationInfo {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub operation_id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub request_schema: String,
    #[serde(default)]
    pub response_schema: String,
    pub source: Provenance,
}

impl OperationInfo {
    /// Identity used for deduplication: method, path and operation id.
    pub fn identity_key(&self) -> String {
        format!("{}|{}|{}", self.method, self.path, self.operation_id)
    }
}

/// One entity as seen by a single source (or, after consolidation, by all of them).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Raw struct or schema name (e.g., "UserCreateReq")
    pub struct_name: String,

    /// Logical entity name used as the join key (e.g., "User")
    pub normalized_name: String,

    pub source: Provenance,

    #[serde(default)]
    pub columns: Vec<ColumnInfo>,

    #[serde(default)]
    pub relations: Vec<RelationNode>,

    #[serde(default)]
    pub operations: Vec<OperationInfo>,
}

impl TableMetadata {
    pub fn new(struct_name: impl Into<String>, source: Provenance) -> Self {
        let struct_name = struct_name.into();
        let normalized_name = crate::normalize::normalize_entity_name(&struct_name);
        Self {
            struct_name,
            normalized_name,
            source,
            columns: Vec::new(),
            relations: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Tables with neither columns nor relations never become entities.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.relations.is_empty()
    }
}

/// The final consolidated document handed to downstream generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedSchema {
    /// Normalized entity name -> merged record
    pub entities: BTreeMap<String, TableMetadata>,

    /// The same records, sorted by normalized name
    pub entity_list: Vec<TableMetadata>,

    pub generated_by: String,
}

impl ConsolidatedSchema {
    pub fn get(&self, normalized_name: &str) -> Option<&TableMetadata> {
        self.entities.get(normalized_name)
    }

    pub fn len(&self) -> usize {
        self.entity_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_list.is_empty()
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_wire_name_fallback() {
        let column = ColumnInfo::new("Name", None, "string", Provenance::SourceDo);
        assert_eq!(column.json_name, "Name");
        assert_eq!(column.wire_name(), "Name");

        let column = ColumnInfo::new("Name", Some("  ".to_string()), "", Provenance::SourceDo);
        assert_eq!(column.json_name, "Name");
        assert_eq!(column.type_name, UNKNOWN_TYPE);
    }

    #[test]
    fn test_empty_constraints_normalize_to_none() {
        assert!(FieldConstraints::default().normalized().is_none());

        let constraints = FieldConstraints {
            min_length: Some(3),
            ..Default::default()
        };
        assert_eq!(constraints.clone().normalized(), Some(constraints));
    }

    #[test]
    fn test_constraints_serialize_without_defaults() {
        let constraints = FieldConstraints {
            required: true,
            enum_values: vec!["a".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_value(&constraints).unwrap();
        assert_eq!(json, serde_json::json!({ "required": true, "enum": ["a"] }));
    }

    #[test]
    fn test_provenance_serialization() {
        assert_eq!(serde_json::to_string(&Provenance::SourceDo).unwrap(), "\"rust:do\"");
        assert_eq!(serde_json::to_string(&Provenance::Merged).unwrap(), "\"merged\"");
        assert_eq!(Provenance::OpenApi.to_string(), "openapi");
    }

    #[test]
    fn test_relation_identity_is_case_insensitive() {
        let a = RelationNode {
            field_name: "UserDetail".to_string(),
            target_struct: "UserDetail".to_string(),
            is_collection: false,
            target_key: "uid".to_string(),
            source_key: "id".to_string(),
            validation: String::new(),
            description: "first".to_string(),
        };
        let b = RelationNode {
            field_name: " userdetail ".to_string(),
            description: "second".to_string(),
            ..a.clone()
        };
        assert_eq!(a.identity_key(), b.identity_key());
    }
}
