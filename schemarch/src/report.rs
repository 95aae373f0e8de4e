//! Human-facing renderings of extracted tables: a Mermaid ER diagram and a
//! plain-text relation summary.

use std::fmt::Write;

use crate::normalize::normalize_entity_name;
use crate::types::TableMetadata;

/// How entities are labelled in a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityLabel {
    /// Raw struct or schema name; suits per-source registries.
    #[default]
    StructName,
    /// Normalized name; suits consolidated output.
    NormalizedName,
}

impl EntityLabel {
    fn of<'a>(&self, table: &'a TableMetadata) -> &'a str {
        match self {
            EntityLabel::StructName => &table.struct_name,
            EntityLabel::NormalizedName => &table.normalized_name,
        }
    }

    fn target(&self, target_struct: &str) -> String {
        let bare = strip_namespace(target_struct);
        match self {
            EntityLabel::StructName => bare.to_string(),
            EntityLabel::NormalizedName => normalize_entity_name(bare),
        }
    }
}

/// Render a Mermaid `erDiagram` with one block per entity and one edge per relation.
///
/// One-to-one relations are drawn `||--||`, one-to-many `||--o{`.
pub fn render_er_diagram<'a>(tables: impl IntoIterator<Item = &'a TableMetadata>, label: EntityLabel) -> String {
    let mut tables: Vec<&TableMetadata> = tables.into_iter().collect();
    if tables.is_empty() {
        return "erDiagram\n  %% No relations found".to_string();
    }
    tables.sort_by(|a, b| label.of(a).cmp(label.of(b)));

    let mut out = String::from("erDiagram\n");

    for table in &tables {
        let _ = writeln!(out, "    {} {{", label.of(table));
        for column in &table.columns {
            let _ = writeln!(out, "        {} {}", mermaid_type(&column.type_name), column.name);
        }
        out.push_str("    }\n\n");
    }

    for table in &tables {
        for relation in &table.relations {
            let cardinality = if relation.is_collection { "||--o{" } else { "||--||" };
            let _ = writeln!(
                out,
                "    {} {} {} : \"{} ({}={})\"",
                label.of(table),
                cardinality,
                label.target(&relation.target_struct),
                relation.field_name,
                relation.target_key,
                relation.source_key,
            );
        }
    }

    out
}

/// Render a per-entity listing of relations, sorted by normalized name then struct name.
pub fn render_relation_summary<'a>(tables: impl IntoIterator<Item = &'a TableMetadata>) -> String {
    let mut tables: Vec<&TableMetadata> = tables.into_iter().collect();
    if tables.is_empty() {
        return "No 'with' associations found. Ensure the scan root and markers are correct.\n".to_string();
    }
    tables.sort_by(|a, b| {
        a.normalized_name
            .cmp(&b.normalized_name)
            .then_with(|| a.struct_name.cmp(&b.struct_name))
    });

    let mut out = String::new();
    for table in tables {
        let _ = writeln!(
            out,
            "Struct: {}   (normalized: {}, source: {})",
            table.struct_name, table.normalized_name, table.source
        );
        for relation in &table.relations {
            let kind = if relation.is_collection { "1:N" } else { "1:1" };
            let _ = writeln!(
                out,
                "  └─ [{kind}] {:<12} -> {:<15} (Map: {}={})",
                relation.field_name, relation.target_struct, relation.target_key, relation.source_key
            );
        }
    }
    out
}

/// Mermaid attribute types cannot contain `.` and arrays read better as `T[]`.
fn mermaid_type(type_name: &str) -> String {
    let cleaned = type_name.replace('.', "_");
    match cleaned.strip_prefix("[]") {
        Some(inner) => format!("{inner}[]"),
        None => cleaned,
    }
}

fn strip_namespace(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
