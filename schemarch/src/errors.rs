use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type returned by schemarch extraction and output.
///
/// Per-file `Io` and `Parse` errors raised while walking sources are logged
/// and skipped by the walker. Everything else aborts the run.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A file could not be read or written.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scan root could not be walked.
    #[error("failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A source file is not valid Rust syntax.
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// The API specification document is not valid structured data.
    #[error("invalid specification document {}: {message}", path.display())]
    Document { path: PathBuf, message: String },

    /// Serializing an output document failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SchemaError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the library.
pub type Result<T, E = SchemaError> = std::result::Result<T, E>;
