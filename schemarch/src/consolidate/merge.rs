//! Merge policies for folding per-source records into one entity.

use std::collections::{HashMap, HashSet};

use crate::types::{ColumnInfo, FieldConstraints, OperationInfo, Provenance, RelationNode, TableMetadata, UNKNOWN_TYPE};

/// Fold `src` into `dst`.
///
/// `dst` becomes `merged`. Its struct name is replaced by the source's when
/// it is empty or when the source is an OpenAPI schema, whose names are the
/// ones downstream consumers see.
pub fn merge_table(dst: &mut TableMetadata, src: &TableMetadata) {
    dst.source = Provenance::Merged;

    merge_columns(&mut dst.columns, &src.columns);
    merge_relations(&mut dst.relations, &src.relations);
    merge_operations(&mut dst.operations, &src.operations);

    if !src.struct_name.is_empty() && (dst.struct_name.is_empty() || src.source == Provenance::OpenApi) {
        dst.struct_name = src.struct_name.clone();
    }
}

/// Merge columns by [`column_key`]; unseen columns are appended in order.
pub fn merge_columns(dst: &mut Vec<ColumnInfo>, src: &[ColumnInfo]) {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(dst.len());
    for (i, column) in dst.iter().enumerate() {
        index.entry(column_key(column)).or_insert(i);
    }

    for column in src {
        let key = column_key(column);
        if key.is_empty() {
            continue;
        }
        match index.get(&key) {
            Some(&i) => {
                let merged = merge_column(&dst[i], column);
                dst[i] = merged;
            }
            None => {
                index.insert(key, dst.len());
                dst.push(column.clone());
            }
        }
    }
}

/// Combine two records of the same logical column. `a` wins on every
/// non-empty field; `b` fills the gaps.
pub fn merge_column(a: &ColumnInfo, b: &ColumnInfo) -> ColumnInfo {
    let mut out = a.clone();

    fill_empty(&mut out.name, &b.name);
    fill_empty(&mut out.json_name, &b.json_name);
    if (out.type_name.is_empty() || out.type_name == UNKNOWN_TYPE) && !b.type_name.is_empty() {
        out.type_name = b.type_name.clone();
    }
    fill_empty(&mut out.description, &b.description);
    fill_empty(&mut out.validation, &b.validation);
    fill_empty(&mut out.additional, &b.additional);
    fill_empty(&mut out.ref_name, &b.ref_name);
    out.is_array |= b.is_array;
    out.constraints = merge_constraints(a.constraints.as_ref(), b.constraints.as_ref());

    out
}

/// Union of two constraint sets, narrowing numeric bounds.
///
/// Flags are OR-ed, lower bounds take the larger value and upper bounds the
/// smaller. Pattern, format and enum keep the first non-empty value. A result
/// with nothing set is `None`.
pub fn merge_constraints(a: Option<&FieldConstraints>, b: Option<&FieldConstraints>) -> Option<FieldConstraints> {
    let (a, b) = match (a, b) {
        (None, None) => return None,
        (Some(only), None) | (None, Some(only)) => return only.clone().normalized(),
        (Some(a), Some(b)) => (a, b),
    };

    let mut out = a.clone();
    out.required |= b.required;
    out.nullable |= b.nullable;
    out.min_length = pick_max(out.min_length, b.min_length);
    out.max_length = pick_min(out.max_length, b.max_length);
    out.minimum = pick_max(out.minimum, b.minimum);
    out.maximum = pick_min(out.maximum, b.maximum);
    fill_empty(&mut out.pattern, &b.pattern);
    fill_empty(&mut out.format, &b.format);
    if out.enum_values.is_empty() {
        out.enum_values = b.enum_values.clone();
    }

    out.normalized()
}

/// Append relations not already present; the first occurrence wins.
pub fn merge_relations(dst: &mut Vec<RelationNode>, src: &[RelationNode]) {
    let mut seen: HashSet<String> = dst.iter().map(RelationNode::identity_key).collect();
    for relation in src {
        if seen.insert(relation.identity_key()) {
            dst.push(relation.clone());
        }
    }
}

/// Append operations not already present; the first occurrence wins.
pub fn merge_operations(dst: &mut Vec<OperationInfo>, src: &[OperationInfo]) {
    let mut seen: HashSet<String> = dst.iter().map(OperationInfo::identity_key).collect();
    for operation in src {
        if seen.insert(operation.identity_key()) {
            dst.push(operation.clone());
        }
    }
}

/// Identity of a column across sources: the wire name (else the raw name),
/// trimmed, lower-cased, with `_` and `-` removed. `role_ids` and `roleIds`
/// share the key `roleids`.
pub fn column_key(column: &ColumnInfo) -> String {
    column
        .wire_name()
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .collect()
}

fn fill_empty(slot: &mut String, fallback: &str) {
    if slot.is_empty() {
        *slot = fallback.to_string();
    }
}

fn pick_max<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b > a { b } else { a }),
        (a, b) => a.or(b),
    }
}

fn pick_min<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b < a { b } else { a }),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, json_name: &str, type_name: &str, source: Provenance) -> ColumnInfo {
        ColumnInfo::new(name, Some(json_name.to_string()), type_name, source)
    }

    fn relation(field: &str, description: &str) -> RelationNode {
        RelationNode {
            field_name: field.to_string(),
            target_struct: "UserDetail".to_string(),
            is_collection: false,
            target_key: "uid".to_string(),
            source_key: "id".to_string(),
            validation: String::new(),
            description: description.to_string(),
        }
    }

    fn operation(method: &str, path: &str) -> OperationInfo {
        OperationInfo {
            method: method.to_string(),
            path: path.to_string(),
            operation_id: String::new(),
            summary: String::new(),
            tags: Vec::new(),
            request_schema: String::new(),
            response_schema: String::new(),
            source: Provenance::OpenApi,
        }
    }

    #[test]
    fn test_column_key_folds_case_and_separators() {
        assert_eq!(column_key(&column("role_ids", "role_ids", "[]int64", Provenance::SourceDo)), "roleids");
        assert_eq!(column_key(&column("roleIds", "roleIds", "[]int", Provenance::OpenApi)), "roleids");
        assert_eq!(column_key(&column("x", " Role-Ids ", "string", Provenance::OpenApi)), "roleids");
    }

    #[test]
    fn test_merge_column_fills_gaps_from_second() {
        let mut a = column("role_ids", "role_ids", UNKNOWN_TYPE, Provenance::SourceDo);
        a.validation = "required".to_string();
        let mut b = column("roleIds", "roleIds", "[]int", Provenance::OpenApi);
        b.is_array = true;
        b.description = "Assigned roles".to_string();
        b.validation = "ignored".to_string();

        let merged = merge_column(&a, &b);
        assert_eq!(merged.name, "role_ids");
        assert_eq!(merged.json_name, "role_ids");
        assert_eq!(merged.type_name, "[]int");
        assert_eq!(merged.validation, "required");
        assert_eq!(merged.description, "Assigned roles");
        assert!(merged.is_array);
        assert_eq!(merged.source, Provenance::SourceDo);
    }

    #[test]
    fn test_constraint_bounds_narrow_in_either_order() {
        let a = FieldConstraints {
            min_length: Some(3),
            max_length: Some(50),
            minimum: Some(0.0),
            ..Default::default()
        };
        let b = FieldConstraints {
            min_length: Some(5),
            max_length: Some(30),
            maximum: Some(10.5),
            required: true,
            ..Default::default()
        };

        for merged in [merge_constraints(Some(&a), Some(&b)), merge_constraints(Some(&b), Some(&a))] {
            let merged = merged.unwrap();
            assert_eq!(merged.min_length, Some(5));
            assert_eq!(merged.max_length, Some(30));
            assert_eq!(merged.minimum, Some(0.0));
            assert_eq!(merged.maximum, Some(10.5));
            assert!(merged.required);
        }
    }

    #[test]
    fn test_constraint_text_fields_keep_first() {
        let a = FieldConstraints {
            pattern: "^a$".to_string(),
            ..Default::default()
        };
        let b = FieldConstraints {
            pattern: "^b$".to_string(),
            format: "email".to_string(),
            enum_values: vec!["x".to_string()],
            ..Default::default()
        };

        let merged = merge_constraints(Some(&a), Some(&b)).unwrap();
        assert_eq!(merged.pattern, "^a$");
        assert_eq!(merged.format, "email");
        assert_eq!(merged.enum_values, vec!["x"]);
    }

    #[test]
    fn test_empty_constraints_collapse() {
        let empty = FieldConstraints::default();
        assert!(merge_constraints(None, None).is_none());
        assert!(merge_constraints(Some(&empty), None).is_none());
        assert!(merge_constraints(Some(&empty), Some(&empty)).is_none());
    }

    #[test]
    fn test_relation_dedupe_keeps_first_description() {
        let mut dst = vec![relation("UserDetail", "first")];
        merge_relations(&mut dst, &[relation("userdetail", "second"), relation("Profile", "other")]);

        assert_eq!(dst.len(), 2);
        assert_eq!(dst[0].description, "first");
        assert_eq!(dst[1].field_name, "Profile");
    }

    #[test]
    fn test_operation_dedupe() {
        let mut dst = vec![operation("GET", "/users")];
        merge_operations(&mut dst, &[operation("GET", "/users"), operation("POST", "/users")]);
        assert_eq!(dst.len(), 2);
    }

    #[test]
    fn test_self_merge_adds_nothing() {
        let mut table = TableMetadata::new("User", Provenance::SourceDo);
        table.columns.push(column("name", "name", "string", Provenance::SourceDo));
        table.relations.push(relation("UserDetail", "detail"));
        table.operations.push(operation("GET", "/users"));

        let mut merged = table.clone();
        merge_table(&mut merged, &table);

        assert_eq!(merged.source, Provenance::Merged);
        assert_eq!(merged.columns, table.columns);
        assert_eq!(merged.relations, table.relations);
        assert_eq!(merged.operations, table.operations);
    }

    #[test]
    fn test_struct_name_prefers_openapi() {
        let mut dst = TableMetadata::new("UserCreateReq", Provenance::SourceApi);
        merge_table(&mut dst, &TableMetadata::new("UserRes", Provenance::SourceDo));
        assert_eq!(dst.struct_name, "UserCreateReq");

        merge_table(&mut dst, &TableMetadata::new("User", Provenance::OpenApi));
        assert_eq!(dst.struct_name, "User");
    }

    #[test]
    fn test_openapi_name_replaces_matching_source_name() {
        let mut dst = TableMetadata::new("User", Provenance::SourceDo);
        merge_table(&mut dst, &TableMetadata::new("CreateUserReq", Provenance::OpenApi));
        assert_eq!(dst.struct_name, "CreateUserReq");
    }
}
