//! Minimal serde model of an OpenAPI 3 document.
//!
//! Only the parts needed for entity extraction are modelled; everything else
//! is ignored during deserialization.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::{Result, SchemaError};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenApiDocument {
    #[serde(default)]
    pub openapi: String,

    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,

    #[serde(default)]
    pub components: Components,
}

impl OpenApiDocument {
    /// Parse a JSON document.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Parse a YAML document.
    pub fn from_yaml(content: &str) -> serde_yaml::Result<Self> {
        serde_yaml::from_str(content)
    }

    /// Look up a component schema by name.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.components.schemas.get(name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
}

/// Operations of a single path, one slot per HTTP method.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
}

impl PathItem {
    /// Declared operations as `(lowercase method, operation)` pairs, in method order.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("get", &self.get),
            ("put", &self.put),
            ("post", &self.post),
            ("delete", &self.delete),
            ("options", &self.options),
            ("head", &self.head),
            ("patch", &self.patch),
            ("trace", &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub operation_id: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub tags: Vec<String>,

    pub request_body: Option<RequestBody>,

    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

/// `type` is a single string in 3.0 and may be a list in 3.1.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", default)]
    pub reference: String,

    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    #[serde(default)]
    pub format: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub properties: BTreeMap<String, Schema>,

    pub items: Option<Box<Schema>>,

    #[serde(default)]
    pub required: Vec<String>,

    #[serde(rename = "enum", default)]
    pub enum_values: Vec<Value>,

    #[serde(default)]
    pub nullable: bool,

    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,

    #[serde(default)]
    pub pattern: String,

    #[serde(default)]
    pub all_of: Vec<Schema>,

    #[serde(default)]
    pub one_of: Vec<Schema>,

    #[serde(default)]
    pub any_of: Vec<Schema>,
}

impl Schema {
    /// The primary declared type, ignoring a 3.1 `"null"` member.
    pub fn primary_type(&self) -> Option<&str> {
        match self.schema_type.as_ref()? {
            SchemaType::Single(ty) => Some(ty.as_str()),
            SchemaType::Multiple(types) => types.iter().map(String::as_str).find(|ty| *ty != "null"),
        }
    }

    /// `nullable: true` (3.0) or a `"null"` member in the type list (3.1).
    pub fn is_nullable(&self) -> bool {
        self.nullable || matches!(&self.schema_type, Some(SchemaType::Multiple(types)) if types.iter().any(|t| t == "null"))
    }

    pub fn uses_composition(&self) -> bool {
        !self.all_of.is_empty() || !self.one_of.is_empty() || !self.any_of.is_empty()
    }
}

/// Read and parse a document; `.yaml`/`.yml` files are read as YAML, anything else as JSON.
pub fn load_document(path: &Path) -> Result<OpenApiDocument> {
    let content = std::fs::read_to_string(path).map_err(|err| SchemaError::io(path, err))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let parsed = if is_yaml {
        OpenApiDocument::from_yaml(&content).map_err(|err| err.to_string())
    } else {
        OpenApiDocument::from_json(&content).map_err(|err| err.to_string())
    };

    parsed.map_err(|message| SchemaError::Document {
        path: path.to_path_buf(),
        message,
    })
}

/// Component name from a `$ref`: `#/components/schemas/User` -> `User`.
pub fn ref_name(reference: &str) -> &str {
    if let Some(name) = reference.strip_prefix("#/components/schemas/") {
        return name;
    }
    match reference.rfind('/') {
        Some(idx) => &reference[idx + 1..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_name() {
        assert_eq!(ref_name("#/components/schemas/User"), "User");
        assert_eq!(ref_name("other.json#/definitions/Role"), "Role");
        assert_eq!(ref_name("User"), "");
    }

    #[test]
    fn test_parse_json_and_yaml_agree() {
        let json = r##"{
            "openapi": "3.0.3",
            "paths": { "/users": { "parameters": [], "get": { "operationId": "listUsers", "responses": {} } } },
            "components": { "schemas": { "User": { "type": "object", "properties": { "name": { "type": "string" } } } } }
        }"##;
        let yaml = r#"
openapi: 3.0.3
paths:
  /users:
    parameters: []
    get:
      operationId: listUsers
      responses: {}
components:
  schemas:
    User:
      type: object
      properties:
        name:
          type: string
"#;

        for doc in [OpenApiDocument::from_json(json).unwrap(), OpenApiDocument::from_yaml(yaml).unwrap()] {
            assert_eq!(doc.openapi, "3.0.3");
            let ops: Vec<_> = doc.paths["/users"].operations().collect();
            assert_eq!(ops.len(), 1);
            assert_eq!(ops[0].0, "get");
            assert_eq!(ops[0].1.operation_id, "listUsers");
            assert!(doc.schema("User").unwrap().properties.contains_key("name"));
        }
    }

    #[test]
    fn test_type_list_nullability() {
        let schema: Schema = serde_json::from_str(r#"{ "type": ["string", "null"] }"#).unwrap();
        assert_eq!(schema.primary_type(), Some("string"));
        assert!(schema.is_nullable());
    }

    #[test]
    fn test_load_document_rejects_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openapi.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, SchemaError::Document { .. }));

        let err = load_document(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SchemaError::Io { .. }));
    }
}
