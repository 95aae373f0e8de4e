//! Rust source parser using syn to extract annotated struct definitions.
//!
//! Field annotations recognized:
//!
//! ```text
//! #[schema(orm = "with:uid=id, where:status=1", v = "required", dc = "Profile", ad = "hint", json = "wire")]
//! #[serde(rename = "wire")]
//! ```
//!
//! `orm` is a composite string of comma-separated `key:value` sub-tags. A
//! `with:` sub-tag turns the field into a relation instead of a column.

use std::path::Path;

use syn::meta::ParseNestedMeta;
use syn::visit::{self, Visit};
use syn::{Attribute, Field, Fields, GenericArgument, ItemStruct, LitStr, PathArguments, Token, Type};

use crate::errors::{Result, SchemaError};
use crate::types::{ColumnInfo, FieldConstraints, Provenance, RelationNode, TableMetadata, UNKNOWN_TYPE};

/// Default source key when a `with:` sub-tag omits one.
pub const DEFAULT_SOURCE_KEY: &str = "id";

/// Wrappers peeled without changing cardinality.
const INDIRECTION_WRAPPERS: &[&str] = &["Option", "Box", "Rc", "Arc", "Cow", "RefCell", "Cell"];

/// Wrappers that make a field a collection.
const COLLECTION_WRAPPERS: &[&str] = &["Vec", "VecDeque", "HashSet", "BTreeSet"];

/// Resolved shape of a field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeShape {
    /// Terminal type label (`string`, `UserDetail`, `entity.User`, `Unknown`)
    pub name: String,
    /// A collection wrapper was peeled on the way down
    pub is_collection: bool,
    /// An `Option` was peeled on the way down
    pub is_optional: bool,
}

/// Read and parse a Rust file, returning every annotated struct with at least
/// one column or relation.
///
/// Only a read failure or a file that is not valid Rust is an error.
/// Annotation problems are logged and the affected field keeps whatever was
/// read before the problem.
pub fn parse_source_file(path: &Path, provenance: Provenance) -> Result<Vec<TableMetadata>> {
    let content = std::fs::read_to_string(path).map_err(|err| SchemaError::io(path, err))?;

    let syntax = syn::parse_file(&content).map_err(|err| SchemaError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    Ok(extract_tables(&syntax, provenance))
}

/// Extract tables from an already parsed file.
///
/// Structs are found at any depth, including inline modules and function
/// bodies.
pub fn extract_tables(file: &syn::File, provenance: Provenance) -> Vec<TableMetadata> {
    let mut collector = StructCollector {
        provenance,
        tables: Vec::new(),
    };
    collector.visit_file(file);
    collector.tables
}

struct StructCollector {
    provenance: Provenance,
    tables: Vec<TableMetadata>,
}

impl<'ast> Visit<'ast> for StructCollector {
    fn visit_item_struct(&mut self, item: &'ast ItemStruct) {
        if let Some(table) = parse_struct(item, self.provenance) {
            self.tables.push(table);
        }
        visit::visit_item_struct(self, item);
    }
}

/// Convert one struct into a table. Returns `None` when nothing was captured.
pub fn parse_struct(item: &ItemStruct, provenance: Provenance) -> Option<TableMetadata> {
    let Fields::Named(fields) = &item.fields else {
        return None;
    };

    let struct_name = item.ident.to_string();
    let rename_all = parse_container_rename_all(&struct_name, &item.attrs);
    let mut table = TableMetadata::new(struct_name, provenance);

    for field in &fields.named {
        match parse_field(&table.struct_name, field, rename_all.as_deref(), provenance) {
            Some(ParsedField::Relation(relation)) => table.relations.push(relation),
            Some(ParsedField::Column(column)) => table.columns.push(column),
            None => {}
        }
    }

    if table.is_empty() {
        return None;
    }
    Some(table)
}

enum ParsedField {
    Column(ColumnInfo),
    Relation(RelationNode),
}

/// Raw annotation strings collected from a field's attributes.
#[derive(Debug, Default)]
struct FieldTags {
    orm: String,
    validation: String,
    description: String,
    additional: String,
    json: Option<String>,
    serde_rename: Option<String>,
}

fn parse_field(struct_name: &str, field: &Field, rename_all: Option<&str>, provenance: Provenance) -> Option<ParsedField> {
    let ident = field.ident.as_ref()?;
    let field_name = ident.to_string();
    let field_name = field_name.strip_prefix("r#").unwrap_or(&field_name).to_string();

    let shape = resolve_type_info(&field.ty);

    let mut tags = FieldTags::default();
    for attr in &field.attrs {
        let parsed = if attr.path().is_ident("schema") {
            parse_schema_attr(attr, &mut tags)
        } else if attr.path().is_ident("serde") {
            parse_serde_attr(attr, &mut tags)
        } else {
            Ok(())
        };
        if let Err(err) = parsed {
            log::warn!("{struct_name}.{field_name}: ignoring unreadable annotation: {err}");
        }
    }

    if let Some(mut relation) = parse_with_tag(&tags.orm) {
        relation.field_name = field_name;
        relation.target_struct = shape.name;
        relation.is_collection = shape.is_collection;
        relation.validation = tags.validation;
        relation.description = tags.description;
        return Some(ParsedField::Relation(relation));
    }

    let json_name = tags
        .json
        .or(tags.serde_rename)
        .or_else(|| rename_all.map(|rule| apply_rename_rule(&field_name, rule)));

    let mut column = ColumnInfo::new(field_name, json_name, shape.name, provenance);
    column.validation = tags.validation;
    column.description = tags.description;
    column.additional = tags.additional;
    column.is_array = shape.is_collection;
    column.constraints = FieldConstraints {
        nullable: shape.is_optional,
        ..Default::default()
    }
    .normalized();

    Some(ParsedField::Column(column))
}

/// Parse `#[schema(...)]` on a field
fn parse_schema_attr(attr: &Attribute, tags: &mut FieldTags) -> syn::Result<()> {
    attr.parse_nested_meta(|meta| {
        let slot = if meta.path.is_ident("orm") {
            &mut tags.orm
        } else if meta.path.is_ident("v") {
            &mut tags.validation
        } else if meta.path.is_ident("dc") {
            &mut tags.description
        } else if meta.path.is_ident("ad") {
            &mut tags.additional
        } else if meta.path.is_ident("json") {
            let value: LitStr = meta.value()?.parse()?;
            tags.json = json_tag_name(&value.value());
            return Ok(());
        } else {
            return skip_meta_value(&meta);
        };

        let value: LitStr = meta.value()?.parse()?;
        *slot = value.value();
        Ok(())
    })
}

/// Parse `#[serde(...)]` on a field; only `rename` matters here.
fn parse_serde_attr(attr: &Attribute, tags: &mut FieldTags) -> syn::Result<()> {
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
            let value: LitStr = meta.value()?.parse()?;
            tags.serde_rename = Some(value.value());
            return Ok(());
        }
        if meta.path.is_ident("rename") && meta.input.peek(syn::token::Paren) {
            meta.parse_nested_meta(|inner| {
                if inner.path.is_ident("serialize") {
                    let value: LitStr = inner.value()?.parse()?;
                    tags.serde_rename = Some(value.value());
                    return Ok(());
                }
                skip_meta_value(&inner)
            })?;
            return Ok(());
        }
        skip_meta_value(&meta)
    })
}

/// Read `#[serde(rename_all = "...")]` on the struct.
fn parse_container_rename_all(struct_name: &str, attrs: &[Attribute]) -> Option<String> {
    let mut rule = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") && meta.input.peek(Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                rule = Some(value.value());
                return Ok(());
            }
            skip_meta_value(&meta)
        });
        if let Err(err) = parsed {
            log::warn!("{struct_name}: ignoring unreadable serde attribute: {err}");
        }
    }
    rule
}

/// Consume the tokens of a nested meta we do not care about, up to the next
/// top-level comma. Values need not be expressions (`value_type = Vec<String>`).
fn skip_meta_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    meta.input.step(|cursor| {
        let mut rest = *cursor;
        let mut angle_depth = 0usize;
        while let Some((_, next)) = rest.token_tree() {
            if let Some((punct, _)) = rest.punct() {
                match punct.as_char() {
                    ',' if angle_depth == 0 => break,
                    '<' => angle_depth += 1,
                    '>' => angle_depth = angle_depth.saturating_sub(1),
                    _ => {}
                }
            }
            rest = next;
        }
        Ok(((), rest))
    })
}

/// `json = "name,omitempty"` keeps only the name; `-` means none.
fn json_tag_name(tag: &str) -> Option<String> {
    let name = tag.split(',').next().unwrap_or_default().trim();
    if name.is_empty() || name == "-" {
        return None;
    }
    Some(name.to_string())
}

/// Parse the `with:` sub-tag of a composite `orm` annotation.
///
/// `"uid=id"`, `"uid = id"` and `" uid= id "` all yield target key `uid` and
/// source key `id`; a bare `"uid"` defaults the source key to `id`.
pub fn parse_with_tag(tag: &str) -> Option<RelationNode> {
    let with_part = tag
        .split(',')
        .map(str::trim)
        .find_map(|segment| segment.strip_prefix("with:"))?
        .trim();

    if with_part.is_empty() {
        return None;
    }

    let (target_key, source_key) = match with_part.split_once('=') {
        Some((target, source)) => (target.trim(), source.trim()),
        None => (with_part, DEFAULT_SOURCE_KEY),
    };

    Some(RelationNode {
        field_name: String::new(),
        target_struct: String::new(),
        is_collection: false,
        target_key: target_key.to_string(),
        source_key: source_key.to_string(),
        validation: String::new(),
        description: String::new(),
    })
}

/// Unwrap references, smart pointers, `Option` and collections down to the
/// terminal named type.
///
/// `Vec<Option<Box<UserDetail>>>` resolves to `UserDetail` with the collection
/// and optional flags set; `entity::User` keeps its namespace as
/// `entity.User`. Unrecognized forms resolve to `Unknown`.
pub fn resolve_type_info(ty: &Type) -> TypeShape {
    let mut is_collection = false;
    let mut is_optional = false;
    let mut current = ty;

    let name = loop {
        match current {
            Type::Reference(reference) => current = &reference.elem,
            Type::Ptr(pointer) => current = &pointer.elem,
            Type::Paren(paren) => current = &paren.elem,
            Type::Group(group) => current = &group.elem,
            Type::Slice(slice) => {
                is_collection = true;
                current = &slice.elem;
            }
            Type::Array(array) => {
                is_collection = true;
                current = &array.elem;
            }
            Type::Path(type_path) => {
                let Some(last) = type_path.path.segments.last() else {
                    break UNKNOWN_TYPE.to_string();
                };
                let ident = last.ident.to_string();
                let wrapper = INDIRECTION_WRAPPERS.contains(&ident.as_str());
                let collection = COLLECTION_WRAPPERS.contains(&ident.as_str());

                if (wrapper || collection)
                    && let Some(inner) = first_type_argument(&last.arguments)
                {
                    is_optional |= ident == "Option";
                    is_collection |= collection;
                    current = inner;
                    continue;
                }

                break terminal_type_name(&type_path.path);
            }
            _ => break UNKNOWN_TYPE.to_string(),
        }
    };

    TypeShape {
        name,
        is_collection,
        is_optional,
    }
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

fn terminal_type_name(path: &syn::Path) -> String {
    let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
    let Some(last) = segments.last() else {
        return UNKNOWN_TYPE.to_string();
    };

    if let Some(label) = primitive_label(last) {
        return label.to_string();
    }

    match segments.len() {
        1 => last.clone(),
        n => format!("{}.{}", segments[n - 2], last),
    }
}

/// Coarse labels for primitive types, shared vocabulary with the OpenAPI side.
fn primitive_label(ident: &str) -> Option<&'static str> {
    let label = match ident {
        "String" | "str" | "char" => "string",
        "i64" | "u64" => "int64",
        "i8" | "i16" | "i32" | "i128" | "isize" | "u8" | "u16" | "u32" | "u128" | "usize" => "int",
        "f32" => "float32",
        "f64" => "float64",
        "bool" => "bool",
        _ => return None,
    };
    Some(label)
}

/// Apply a serde `rename_all` rule to a snake_case field name.
fn apply_rename_rule(field_name: &str, rule: &str) -> String {
    let words: Vec<&str> = field_name.split('_').filter(|w| !w.is_empty()).collect();
    let capitalize = |word: &str| {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        }
    };

    match rule {
        "lowercase" => field_name.to_lowercase(),
        "UPPERCASE" => field_name.to_uppercase(),
        "PascalCase" => words.iter().map(|w| capitalize(w)).collect(),
        "camelCase" => words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.to_string() } else { capitalize(w) })
            .collect(),
        "SCREAMING_SNAKE_CASE" => field_name.to_uppercase(),
        "kebab-case" => words.join("-"),
        "SCREAMING-KEBAB-CASE" => words.join("-").to_uppercase(),
        _ => field_name.to_string(),
    }
}
