//! Builder that runs the extraction pipeline and writes the result.

use anyhow::{Context, Result};
use schemarch::source::{SourceStats, default_markers};
use schemarch::{DEFAULT_GENERATED_BY, Pipeline, PipelineConfig, to_json_string, write_if_changed};
use std::path::PathBuf;

/// Builder for configuring and running the schema generator.
pub struct SchemaGenerator {
    scan_root: PathBuf,
    /// Empty means the library defaults
    markers: Vec<String>,
    openapi: Option<PathBuf>,
    output_file: PathBuf,
    generated_by: String,
    emit_rerun_hints: bool,
}

impl SchemaGenerator {
    /// Create a new generator with default settings.
    pub fn new() -> Self {
        Self {
            scan_root: PathBuf::from("src/"),
            markers: Vec::new(),
            openapi: None,
            output_file: PathBuf::from("schema.logical.json"),
            generated_by: DEFAULT_GENERATED_BY.to_string(),
            emit_rerun_hints: true,
        }
    }

    /// Set the directory scanned for annotated structs.
    ///
    /// Default: `src/`
    pub fn scan_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.scan_root = path.into();
        self
    }

    /// Add a path marker. Any marker replaces the defaults (`/model/do`, `/api`).
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }

    /// Set the OpenAPI document (JSON or YAML) to merge in.
    pub fn openapi(mut self, path: impl Into<PathBuf>) -> Self {
        self.openapi = Some(path.into());
        self
    }

    /// Set the output file path for the consolidated document.
    ///
    /// Default: `schema.logical.json`
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = path.into();
        self
    }

    /// Set the `generated_by` tag.
    ///
    /// Default: `schemarch`
    pub fn generated_by(mut self, tag: impl Into<String>) -> Self {
        self.generated_by = tag.into();
        self
    }

    /// Disable the `cargo:rerun-if-changed` lines, for use outside build scripts.
    pub fn without_rerun_hints(mut self) -> Self {
        self.emit_rerun_hints = false;
        self
    }

    /// Run the generator.
    ///
    /// Returns whether the output file was (re)written. An unchanged document
    /// leaves the file untouched so dependent build steps are not retriggered.
    pub fn run(self) -> Result<bool> {
        let markers = if self.markers.is_empty() { default_markers() } else { self.markers };
        let pipeline = Pipeline::new(PipelineConfig {
            scan_root: self.scan_root,
            markers,
            openapi: self.openapi,
            generated_by: self.generated_by,
        });

        if self.emit_rerun_hints {
            println!("cargo:rerun-if-changed={}", pipeline.config().scan_root.display());
            if let Some(openapi) = &pipeline.config().openapi {
                println!("cargo:rerun-if-changed={}", openapi.display());
            }
        }

        let run = pipeline
            .run()
            .with_context(|| format!("Failed to extract schema from {}", pipeline.config().scan_root.display()))?;

        for warning in skip_warnings(&run.extraction.source_stats) {
            println!("cargo:warning={warning}");
        }

        let content = to_json_string(&run.schema).context("Failed to serialize logical schema")?;
        let written = write_if_changed(&self.output_file, &content)
            .with_context(|| format!("Failed to write {}", self.output_file.display()))?;

        if written {
            eprintln!(
                "schemarch-build: Generated {} with {} entities",
                self.output_file.display(),
                run.schema.len()
            );
        }

        Ok(written)
    }
}

/// Build-script warnings for source files the scan had to skip. Cargo shows
/// these even though no logger is installed in `build.rs`.
fn skip_warnings(stats: &SourceStats) -> Vec<String> {
    if stats.files_skipped == 0 {
        return Vec::new();
    }
    let mut warnings = vec![format!("schemarch: {} source file(s) skipped", stats.files_skipped)];
    warnings.extend(
        stats
            .skipped
            .iter()
            .map(|file| format!("schemarch: skipped {}: {}", file.relative_path, file.reason.replace('\n', " "))),
    );
    warnings
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        Self::new()
    }
}
