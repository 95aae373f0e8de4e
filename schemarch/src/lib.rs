//! schemarch core library.
//!
//! Extracts a logical data model from annotated Rust structs and OpenAPI 3
//! documents, joins both views on a normalized entity name and emits one
//! deterministic JSON document for downstream generators.

pub mod consolidate;
pub mod errors;
pub mod normalize;
pub mod openapi;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod source;
pub mod types;
pub mod writer;

pub use consolidate::consolidate;
pub use errors::*;
pub use normalize::normalize_entity_name;
pub use pipeline::{Extraction, Pipeline, PipelineConfig, PipelineOutput};
pub use registry::SchemaRegistry;
pub use report::{EntityLabel, render_er_diagram, render_relation_summary};
pub use types::{
    ColumnInfo, ConsolidatedSchema, DEFAULT_GENERATED_BY, FieldConstraints, OperationInfo, Provenance, RelationNode,
    TableMetadata, UNKNOWN_TYPE,
};
pub use writer::{to_json_string, write_atomic, write_if_changed, write_json_atomic};
