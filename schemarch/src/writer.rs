//! Output writers. Files are replaced atomically: content goes to a temp file
//! in the destination directory, which is then renamed over the target.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::errors::{Result, SchemaError};

/// Pretty JSON with a trailing newline.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

/// Serialize `value` and atomically write it to `path`.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = to_json_string(value)?;
    write_atomic(path, json.as_bytes())
}

/// Atomically replace `path` with `contents`, creating parent directories.
///
/// Readers see either the previous file or the complete new one.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|err| SchemaError::io(dir, err))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|err| SchemaError::io(dir, err))?;
    temp.write_all(contents).map_err(|err| SchemaError::io(temp.path(), err))?;
    temp.as_file().sync_all().map_err(|err| SchemaError::io(temp.path(), err))?;
    temp.persist(path).map_err(|err| SchemaError::io(path, err.error))?;

    log::debug!("wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

/// Write only when the file is missing or its content differs. Returns
/// whether a write happened.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<bool> {
    match std::fs::read_to_string(path) {
        Ok(existing) if existing == contents => Ok(false),
        _ => write_atomic(path, contents.as_bytes()).map(|()| true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json_atomic_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/schema.json");

        write_json_atomic(&path, &serde_json::json!({ "a": 1 })).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\n  \"a\": 1\n}\n");

        write_json_atomic(&path, &serde_json::json!({ "b": 2 })).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\n  \"b\": 2\n}\n");

        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_write_if_changed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");

        assert!(write_if_changed(&path, "one").unwrap());
        assert!(!write_if_changed(&path, "one").unwrap());
        assert!(write_if_changed(&path, "two").unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
    }
}
