//! File discovery for annotated model and API structs.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::errors::{Result, SchemaError};
use crate::types::Provenance;

/// Marker path segments recognized by default.
pub const DEFAULT_MARKERS: &[&str] = &["/model/do", "/api"];

/// Discovered source file with basic metadata
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Path as found by the walk
    pub path: PathBuf,
    /// Path relative to the scan root, slash separated
    pub relative_path: String,
    /// Provenance derived from the path markers
    pub provenance: Provenance,
}

/// Walk `root` recursively and return every `.rs` file whose path contains
/// one of `markers`.
///
/// The marker test is a plain substring check on the slash-normalized path.
/// An unreadable root is an error; unreadable entries below it are logged and
/// skipped. Results are sorted by relative path.
pub fn discover_files(root: &Path, markers: &[String]) -> Result<Vec<DiscoveredFile>> {
    let mut discovered = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(SchemaError::Walk {
                    root: root.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                log::warn!("skipping unreadable entry under {}: {err}", root.display());
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "rs") {
            continue;
        }

        let path_slash = to_slash(path);
        if !markers.iter().any(|marker| path_slash.contains(marker.as_str())) {
            continue;
        }

        let relative_path = to_slash(path.strip_prefix(root).unwrap_or(path));
        discovered.push(DiscoveredFile {
            path: path.to_path_buf(),
            relative_path,
            provenance: provenance_for_path(path),
        });
    }

    discovered.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    Ok(discovered)
}

/// Classify a source file by its path markers.
pub fn provenance_for_path(path: &Path) -> Provenance {
    let path_slash = to_slash(path);
    if path_slash.contains("/model/do") {
        Provenance::SourceDo
    } else if path_slash.contains("/api") {
        Provenance::SourceApi
    } else {
        Provenance::Source
    }
}

/// Default markers as owned strings, for config and CLI defaults.
pub fn default_markers() -> Vec<String> {
    DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
