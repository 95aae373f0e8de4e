//! Component schema resolution.
//!
//! `$ref`, `allOf`, `oneOf` and `anyOf` are flattened into one property set
//! with an explicit worklist, so cyclic or deeply nested documents neither
//! loop forever nor grow the call stack.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde_json::Value;

use super::document::{OpenApiDocument, Schema, ref_name};
use crate::types::{ColumnInfo, FieldConstraints, Provenance, TableMetadata, UNKNOWN_TYPE};

/// Properties and required names gathered from a schema and everything it composes.
#[derive(Debug, Default)]
pub struct CollectedObject<'a> {
    pub properties: BTreeMap<String, &'a Schema>,
    pub required: BTreeSet<String>,
}

/// Resolved type of a property schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeLabel {
    pub name: String,
    pub is_array: bool,
    /// Component referenced directly or through array items
    pub ref_name: Option<String>,
}

impl TypeLabel {
    fn plain(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_array: false,
            ref_name: None,
        }
    }
}

enum Task<'a> {
    /// Resolve references and queue composed branches.
    Expand(&'a Schema),
    /// Merge the schema's own properties and required list.
    Apply(&'a Schema),
}

/// Flatten `schema` into its effective property set.
///
/// Composed branches are applied before the schema's own properties, so a
/// schema can override what it inherits. `allOf` contributes every branch;
/// `oneOf` and `anyOf` contribute only their first branch. Reference targets
/// are expanded at most once; `self_name` marks the component being resolved
/// as already visited.
pub fn collect_object<'a>(doc: &'a OpenApiDocument, schema: &'a Schema, self_name: Option<&str>) -> CollectedObject<'a> {
    let mut collected = CollectedObject::default();
    let mut visited: HashSet<String> = self_name.map(str::to_string).into_iter().collect();
    let mut stack = vec![Task::Expand(schema)];

    while let Some(task) = stack.pop() {
        match task {
            Task::Expand(current) => {
                if !current.reference.is_empty() {
                    let name = ref_name(&current.reference);
                    if name.is_empty() || !visited.insert(name.to_string()) {
                        continue;
                    }
                    if let Some(target) = doc.schema(name) {
                        stack.push(Task::Expand(target));
                    }
                    continue;
                }

                let mut branches: Vec<&Schema> = current.all_of.iter().collect();
                branches.extend(current.one_of.first());
                branches.extend(current.any_of.first());

                // Stack is LIFO: own properties go underneath the branches.
                stack.push(Task::Apply(current));
                stack.extend(branches.into_iter().rev().map(Task::Expand));
            }
            Task::Apply(current) => {
                collected.required.extend(current.required.iter().cloned());
                for (name, property) in &current.properties {
                    collected.properties.insert(name.clone(), property);
                }
            }
        }
    }

    collected
}

/// Map a property schema to a coarse type label.
pub fn type_label(schema: &Schema) -> TypeLabel {
    if !schema.reference.is_empty() {
        let name = ref_name(&schema.reference);
        if name.is_empty() {
            return TypeLabel::plain(UNKNOWN_TYPE);
        }
        return TypeLabel {
            name: name.to_string(),
            is_array: false,
            ref_name: Some(name.to_string()),
        };
    }

    match schema.primary_type() {
        Some("array") => {
            let item = match schema.items.as_deref() {
                Some(items) => type_label(items),
                None => TypeLabel::plain(UNKNOWN_TYPE),
            };
            TypeLabel {
                name: format!("[]{}", item.name),
                is_array: true,
                ref_name: item.ref_name,
            }
        }
        Some("object") => TypeLabel::plain("object"),
        Some("string") => TypeLabel::plain("string"),
        Some("integer") if schema.format == "int64" => TypeLabel::plain("int64"),
        Some("integer") => TypeLabel::plain("int"),
        Some("number") if schema.format == "float" => TypeLabel::plain("float32"),
        Some("number") => TypeLabel::plain("float64"),
        Some("boolean") => TypeLabel::plain("bool"),
        None if schema.uses_composition() => TypeLabel::plain("object"),
        _ => TypeLabel::plain(UNKNOWN_TYPE),
    }
}

/// Copy validation keywords into constraints; `None` when nothing is set.
pub fn constraints_for(schema: &Schema) -> Option<FieldConstraints> {
    FieldConstraints {
        required: false,
        nullable: schema.is_nullable(),
        min_length: schema.min_length,
        max_length: schema.max_length,
        minimum: schema.minimum,
        maximum: schema.maximum,
        pattern: schema.pattern.clone(),
        format: schema.format.clone(),
        enum_values: schema.enum_values.iter().map(enum_value_string).collect(),
    }
    .normalized()
}

fn enum_value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build the table for one component schema. Columns come out sorted by property name.
pub fn table_from_schema(doc: &OpenApiDocument, name: &str, schema: &Schema) -> TableMetadata {
    let collected = collect_object(doc, schema, Some(name));
    let mut table = TableMetadata::new(name, Provenance::OpenApi);

    for (property_name, property) in &collected.properties {
        let label = type_label(property);
        let mut constraints = constraints_for(property);
        if collected.required.contains(property_name) {
            constraints.get_or_insert_with(FieldConstraints::default).required = true;
        }

        let mut column = ColumnInfo::new(property_name.clone(), Some(property_name.clone()), label.name, Provenance::OpenApi);
        column.description = property.description.clone();
        column.constraints = constraints;
        column.ref_name = label.ref_name.unwrap_or_default();
        column.is_array = label.is_array;
        table.columns.push(column);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: &str) -> OpenApiDocument {
        OpenApiDocument::from_json(json).unwrap()
    }

    fn property_names(collected: &CollectedObject<'_>) -> Vec<String> {
        collected.properties.keys().cloned().collect()
    }

    #[test]
    fn test_all_of_unions_branches_and_required() {
        let doc = doc(r##"{ "components": { "schemas": {
            "Base": { "type": "object", "required": ["id"], "properties": { "id": { "type": "integer", "format": "int64" } } },
            "User": { "allOf": [
                { "$ref": "#/components/schemas/Base" },
                { "type": "object", "required": ["name"], "properties": { "name": { "type": "string" } } }
            ] }
        } } }"##);

        let collected = collect_object(&doc, doc.schema("User").unwrap(), Some("User"));
        assert_eq!(property_names(&collected), vec!["id", "name"]);
        assert!(collected.required.contains("id"));
        assert!(collected.required.contains("name"));
    }

    #[test]
    fn test_one_of_and_any_of_take_first_branch() {
        let doc = doc(r##"{ "components": { "schemas": {
            "Pet": {
                "oneOf": [
                    { "properties": { "bark": { "type": "boolean" } } },
                    { "properties": { "meow": { "type": "boolean" } } }
                ],
                "anyOf": [
                    { "properties": { "legs": { "type": "integer" } } },
                    { "properties": { "wings": { "type": "integer" } } }
                ]
            }
        } } }"##);

        let collected = collect_object(&doc, doc.schema("Pet").unwrap(), Some("Pet"));
        assert_eq!(property_names(&collected), vec!["bark", "legs"]);
    }

    #[test]
    fn test_cyclic_references_terminate() {
        let doc = doc(r##"{ "components": { "schemas": {
            "A": { "allOf": [ { "$ref": "#/components/schemas/B" } ], "properties": { "a": { "type": "string" } } },
            "B": { "allOf": [ { "$ref": "#/components/schemas/A" } ], "properties": { "b": { "type": "string" } } },
            "Self": { "allOf": [ { "$ref": "#/components/schemas/Self" } ], "properties": { "s": { "type": "string" } } }
        } } }"##);

        let collected = collect_object(&doc, doc.schema("A").unwrap(), Some("A"));
        assert_eq!(property_names(&collected), vec!["a", "b"]);

        let collected = collect_object(&doc, doc.schema("Self").unwrap(), Some("Self"));
        assert_eq!(property_names(&collected), vec!["s"]);
    }

    #[test]
    fn test_own_properties_override_inherited() {
        let doc = doc(r##"{ "components": { "schemas": {
            "Base": { "properties": { "name": { "type": "integer" } } },
            "User": { "allOf": [ { "$ref": "#/components/schemas/Base" } ], "properties": { "name": { "type": "string" } } }
        } } }"##);

        let collected = collect_object(&doc, doc.schema("User").unwrap(), Some("User"));
        assert_eq!(type_label(collected.properties["name"]).name, "string");
    }

    #[test]
    fn test_dangling_reference_contributes_nothing() {
        let doc = doc(r##"{ "components": { "schemas": {
            "User": { "allOf": [ { "$ref": "#/components/schemas/Missing" } ], "properties": { "id": { "type": "integer" } } }
        } } }"##);

        let collected = collect_object(&doc, doc.schema("User").unwrap(), Some("User"));
        assert_eq!(property_names(&collected), vec!["id"]);
    }

    #[test]
    fn test_type_labels() {
        let cases = [
            (r#"{ "type": "string" }"#, "string", false, None),
            (r#"{ "type": "integer" }"#, "int", false, None),
            (r#"{ "type": "integer", "format": "int64" }"#, "int64", false, None),
            (r#"{ "type": "number", "format": "float" }"#, "float32", false, None),
            (r#"{ "type": "number" }"#, "float64", false, None),
            (r#"{ "type": "boolean" }"#, "bool", false, None),
            (r#"{ "type": "object" }"#, "object", false, None),
            (r##"{ "$ref": "#/components/schemas/Role" }"##, "Role", false, Some("Role")),
            (r##"{ "type": "array", "items": { "$ref": "#/components/schemas/Role" } }"##, "[]Role", true, Some("Role")),
            (r#"{ "type": "array", "items": { "type": "integer" } }"#, "[]int", true, None),
            (r#"{ "type": "array" }"#, "[]Unknown", true, None),
            (r#"{ "allOf": [ { "type": "object" } ] }"#, "object", false, None),
            (r#"{ "type": "file" }"#, "Unknown", false, None),
            (r#"{}"#, "Unknown", false, None),
        ];

        for (json, name, is_array, reference) in cases {
            let schema: Schema = serde_json::from_str(json).unwrap();
            let label = type_label(&schema);
            assert_eq!(label.name, name, "label for {json}");
            assert_eq!(label.is_array, is_array, "array flag for {json}");
            assert_eq!(label.ref_name.as_deref(), reference, "ref for {json}");
        }
    }

    #[test]
    fn test_constraints_copied_and_empty_discarded() {
        let schema: Schema = serde_json::from_str(
            r#"{ "type": "string", "minLength": 3, "maxLength": 30, "pattern": "^[a-z]+$", "enum": ["a", 1, true] }"#,
        )
        .unwrap();
        let constraints = constraints_for(&schema).unwrap();
        assert_eq!(constraints.min_length, Some(3));
        assert_eq!(constraints.max_length, Some(30));
        assert_eq!(constraints.pattern, "^[a-z]+$");
        assert_eq!(constraints.enum_values, vec!["a", "1", "true"]);

        let schema: Schema = serde_json::from_str(r#"{ "type": "string" }"#).unwrap();
        assert!(constraints_for(&schema).is_none());
    }

    #[test]
    fn test_table_from_schema_marks_required() {
        let doc = doc(r##"{ "components": { "schemas": {
            "User": { "type": "object", "required": ["name"], "properties": {
                "name": { "type": "string", "description": "Display name" },
                "roleIds": { "type": "array", "items": { "type": "integer" } }
            } }
        } } }"##);

        let table = table_from_schema(&doc, "User", doc.schema("User").unwrap());
        assert_eq!(table.source, Provenance::OpenApi);
        assert_eq!(table.normalized_name, "User");
        assert_eq!(table.columns.len(), 2);

        let name = &table.columns[0];
        assert_eq!(name.name, "name");
        assert_eq!(name.description, "Display name");
        assert!(name.constraints.as_ref().unwrap().required);

        let role_ids = &table.columns[1];
        assert_eq!(role_ids.type_name, "[]int");
        assert!(role_ids.is_array);
        assert!(role_ids.constraints.is_none());
    }
}
