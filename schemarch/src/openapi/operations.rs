//! Operation extraction and entity association.

use std::collections::BTreeMap;

use super::document::{MediaType, OpenApiDocument, Operation, RequestBody, Response, Schema, ref_name};
use crate::types::{OperationInfo, Provenance};

/// Status codes tried, in order, before falling back to `default`.
const SUCCESS_CODES: &[&str] = &["200", "201", "202", "204"];

/// Media types tried, in order, before falling back to the first sorted key.
const PREFERRED_MEDIA_TYPES: &[&str] = &["application/json", "application/ld+json"];

/// Every operation in the document, ordered by path and then by method.
pub fn extract_operations(doc: &OpenApiDocument) -> Vec<OperationInfo> {
    doc.paths
        .iter()
        .flat_map(|(path, item)| {
            item.operations()
                .map(move |(method, operation)| operation_info(path, method, operation))
        })
        .collect()
}

/// Build the record for one operation. `method` is upper-cased.
pub fn operation_info(path: &str, method: &str, operation: &Operation) -> OperationInfo {
    OperationInfo {
        method: method.to_uppercase(),
        path: path.to_string(),
        operation_id: operation.operation_id.clone(),
        summary: operation.summary.clone(),
        tags: operation.tags.clone(),
        request_schema: request_schema_name(operation.request_body.as_ref()),
        response_schema: response_schema_name(&operation.responses),
        source: Provenance::OpenApi,
    }
}

pub fn request_schema_name(body: Option<&RequestBody>) -> String {
    body.and_then(|body| pick_media_schema(&body.content))
        .map(schema_ref_or_item_ref)
        .unwrap_or_default()
}

/// Schema name of the first success response, else `default`, else the lowest status code.
pub fn response_schema_name(responses: &BTreeMap<String, Response>) -> String {
    let response = SUCCESS_CODES
        .iter()
        .find_map(|code| responses.get(*code))
        .or_else(|| responses.get("default"))
        .or_else(|| responses.values().next());

    response
        .and_then(|response| pick_media_schema(&response.content))
        .map(schema_ref_or_item_ref)
        .unwrap_or_default()
}

pub fn pick_media_schema(content: &BTreeMap<String, MediaType>) -> Option<&Schema> {
    let media = PREFERRED_MEDIA_TYPES
        .iter()
        .find_map(|media_type| content.get(*media_type))
        .or_else(|| content.values().next())?;
    media.schema.as_ref()
}

/// Referenced component name of a schema, or of its array items.
pub fn schema_ref_or_item_ref(schema: &Schema) -> String {
    if !schema.reference.is_empty() {
        return ref_name(&schema.reference).to_string();
    }
    match schema.items.as_deref() {
        Some(items) if schema.primary_type() == Some("array") && !items.reference.is_empty() => {
            ref_name(&items.reference).to_string()
        }
        _ => String::new(),
    }
}

/// Raw entity name an operation belongs to, before normalization.
///
/// Tries the request schema, the response schema, the first tag and finally
/// the path. May be empty.
pub fn infer_entity_name(operation: &OperationInfo) -> String {
    if !operation.request_schema.is_empty() {
        return operation.request_schema.clone();
    }
    if !operation.response_schema.is_empty() {
        return operation.response_schema.clone();
    }
    match operation.tags.first() {
        Some(tag) if !tag.is_empty() => tag.clone(),
        _ => entity_from_path(&operation.path),
    }
}

/// Guess an entity from a URL path: `/api/v1/users/{id}` -> `User`.
///
/// Leading `api` and version segments are dropped. A trailing `{param}` is
/// skipped in favour of the segment before it, one trailing `s` is trimmed
/// and snake or kebab case is folded into PascalCase.
pub fn entity_from_path(path: &str) -> String {
    let mut segments: Vec<&str> = path.trim_matches('/').split('/').map(str::trim).filter(|s| !s.is_empty()).collect();

    if segments.first() == Some(&"api") {
        segments.remove(0);
    }
    if segments.first().is_some_and(|segment| is_version_segment(segment)) {
        segments.remove(0);
    }

    let Some(mut last) = segments.pop() else {
        return String::new();
    };
    if is_path_param(last) {
        match segments.pop() {
            Some(previous) if !is_path_param(previous) => last = previous,
            _ => return String::new(),
        }
    }

    let singular = last.strip_suffix('s').unwrap_or(last);
    to_pascal_case(singular)
}

fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix(['v', 'V'])
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

fn is_path_param(segment: &str) -> bool {
    segment.starts_with('{')
}

fn to_pascal_case(segment: &str) -> String {
    segment
        .split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
