//! Entity name normalization.
//!
//! [`normalize_entity_name`] is the only join key between the source walker
//! and the OpenAPI reader. Both extractors go through it exactly once per raw
//! name; re-normalizing an already normalized name is not meaningful.

use crate::types::UNKNOWN_TYPE;

/// Version and namespace prefixes.
const PREFIXES: &[&str] = &["V1", "V2", "Api"];

/// Leading CRUD verbs (`CreateUserReq`).
const VERB_PREFIXES: &[&str] = &["Create", "Update", "Delete", "Add", "Edit", "Get", "List", "Query"];

/// Request/response and CRUD suffixes, checked in this order, once each.
const SUFFIXES: &[&str] = &[
    "Req", "Request", "Res", "Response", "Input", "Output", "Create", "Update", "Add", "Edit", "Delete", "Item",
    "Detail", "List", "Get", "Query", "Form", "Dto", "DTO",
];

/// Map a raw struct or schema name to its logical entity name.
///
/// Never fails and never returns an empty string: when stripping would remove
/// everything, the (trimmed) input is returned unchanged.
pub fn normalize_entity_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return UNKNOWN_TYPE.to_string();
    }

    let unqualified = trimmed.rsplit('.').next().unwrap_or(trimmed);
    let mut cleaned = unqualified;

    for prefix in PREFIXES {
        cleaned = strip_camel_prefix(cleaned, prefix);
    }
    for verb in VERB_PREFIXES {
        let stripped = strip_camel_prefix(cleaned, verb);
        if stripped.len() != cleaned.len() {
            cleaned = stripped;
            break;
        }
    }
    for suffix in SUFFIXES {
        cleaned = cleaned.strip_suffix(suffix).unwrap_or(cleaned);
    }

    if cleaned.is_empty() {
        return if unqualified.is_empty() { trimmed.to_string() } else { unqualified.to_string() };
    }
    cleaned.to_string()
}

/// Strip `prefix` only when it is a whole camel-case word (`ApiUser`, not `Apiary`).
fn strip_camel_prefix<'a>(name: &'a str, prefix: &str) -> &'a str {
    match name.strip_prefix(prefix) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_table() {
        let cases = [
            ("User", "User"),
            ("UserCreateReq", "User"),
            ("UserCreateRes", "User"),
            ("UserUpdateRequest", "User"),
            ("UserListResponse", "User"),
            ("UserGetOutput", "User"),
            ("UserDeleteInput", "User"),
            ("UserItem", "User"),
            ("UserDetail", "User"),
            ("UserForm", "User"),
            ("UserDto", "User"),
            ("UserDTO", "User"),
            ("CreateUserReq", "User"),
            ("GetUserRes", "User"),
            ("V1UserReq", "User"),
            ("ApiUserReq", "User"),
            ("V2ApiUser", "User"),
            ("v1.UserCreateReq", "User"),
            ("entity.User", "User"),
            ("Apiary", "Apiary"),
            ("Listing", "Listing"),
            ("Roles", "Roles"),
        ];

        for (raw, expected) in cases {
            assert_eq!(normalize_entity_name(raw), expected, "normalizing {raw}");
        }
    }

    #[test]
    fn test_normalization_never_returns_empty() {
        assert_eq!(normalize_entity_name("Req"), "Req");
        assert_eq!(normalize_entity_name("CreateReq"), "CreateReq");
        assert_eq!(normalize_entity_name("Dto"), "Dto");
        assert_eq!(normalize_entity_name(""), UNKNOWN_TYPE);
        assert_eq!(normalize_entity_name("   "), UNKNOWN_TYPE);
    }

    #[test]
    fn test_normalization_is_deterministic() {
        for raw in ["UserCreateReq", "OrderItem", "", "x"] {
            assert_eq!(normalize_entity_name(raw), normalize_entity_name(raw));
        }
    }
}
