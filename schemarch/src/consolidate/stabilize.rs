use crate::types::TableMetadata;

/// Put a table into canonical order.
///
/// Columns sort by wire name and operations by `(path, method)`. Relations
/// keep encounter order. Sorts are stable, so ties keep merge order.
pub fn stabilize_table(table: &mut TableMetadata) {
    table.columns.sort_by(|a, b| a.wire_name().cmp(b.wire_name()));
    table
        .operations
        .sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.method.cmp(&b.method)));
}

/// Sort an entity list by normalized name.
pub fn sort_entities(tables: &mut [TableMetadata]) {
    tables.sort_by(|a, b| a.normalized_name.cmp(&b.normalized_name));
}
