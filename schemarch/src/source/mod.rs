//! Source-structure extraction from annotated Rust files.
//!
//! This module provides functionality to:
//! - Discover eligible files under a scan root (path marker filter)
//! - Parse struct definitions with syn, without compiling anything
//! - Turn fields into columns or `with:` relations

mod discovery;
mod parser;

use std::path::Path;

pub use discovery::{DEFAULT_MARKERS, DiscoveredFile, default_markers, discover_files, provenance_for_path};
pub use parser::{DEFAULT_SOURCE_KEY, TypeShape, extract_tables, parse_source_file, parse_struct, parse_with_tag, resolve_type_info};

use crate::errors::Result;
use crate::registry::SchemaRegistry;

/// Counters reported after a source walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub tables_found: usize,
    /// One entry per skipped file, in walk order
    pub skipped: Vec<SkippedFile>,
}

/// A source file left out of the walk and the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub relative_path: String,
    pub reason: String,
}

/// Walk `root`, parse every eligible file and insert the resulting tables
/// into `registry`.
///
/// Files that cannot be read or parsed are logged and skipped; only an
/// unreadable root aborts.
pub fn extract_sources(root: &Path, markers: &[String], registry: &mut SchemaRegistry) -> Result<SourceStats> {
    let files = discover_files(root, markers)?;
    let mut stats = SourceStats::default();

    for file in &files {
        match parse_source_file(&file.path, file.provenance) {
            Ok(tables) => {
                stats.files_scanned += 1;
                stats.tables_found += tables.len();
                log::debug!("{}: {} table(s)", file.relative_path, tables.len());
                for table in tables {
                    registry.insert(table);
                }
            }
            Err(err) => {
                stats.files_skipped += 1;
                log::warn!("skipping {}: {err}", file.relative_path);
                stats.skipped.push(SkippedFile {
                    relative_path: file.relative_path.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(stats)
}
