//! End-to-end extraction: sources and OpenAPI into a registry, then consolidation.

use std::path::PathBuf;

use crate::consolidate::consolidate;
use crate::errors::Result;
use crate::openapi::{extract_document, load_document};
use crate::registry::SchemaRegistry;
use crate::source::{SourceStats, default_markers, extract_sources};
use crate::types::{ConsolidatedSchema, DEFAULT_GENERATED_BY};

/// Inputs of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory walked for annotated source files
    pub scan_root: PathBuf,
    /// Path substrings a source file must contain to be scanned
    pub markers: Vec<String>,
    /// Optional OpenAPI document (JSON or YAML)
    pub openapi: Option<PathBuf>,
    /// Tag written into `generated_by`
    pub generated_by: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scan_root: PathBuf::from("./src"),
            markers: default_markers(),
            openapi: None,
            generated_by: DEFAULT_GENERATED_BY.to_string(),
        }
    }
}

/// Per-source tables, before consolidation.
#[derive(Debug, Default)]
pub struct Extraction {
    pub registry: SchemaRegistry,
    pub source_stats: SourceStats,
    pub openapi_tables: usize,
}

/// Result of a full run.
#[derive(Debug)]
pub struct PipelineOutput {
    pub extraction: Extraction,
    pub schema: ConsolidatedSchema,
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run both extractors into one registry. Source tables are inserted
    /// first, then OpenAPI tables in component name order.
    pub fn extract(&self) -> Result<Extraction> {
        let mut extraction = Extraction::default();

        log::info!("scanning {} for annotated structs", self.config.scan_root.display());
        extraction.source_stats = extract_sources(&self.config.scan_root, &self.config.markers, &mut extraction.registry)?;
        log::info!(
            "source scan: {} file(s) parsed, {} skipped, {} table(s)",
            extraction.source_stats.files_scanned,
            extraction.source_stats.files_skipped,
            extraction.source_stats.tables_found
        );

        if let Some(path) = &self.config.openapi {
            log::info!("reading OpenAPI document {}", path.display());
            let doc = load_document(path)?;
            let tables = extract_document(&doc);
            extraction.openapi_tables = tables.len();
            for table in tables {
                extraction.registry.insert(table);
            }
            log::info!("openapi: {} table(s)", extraction.openapi_tables);
        }

        Ok(extraction)
    }

    /// Extract and consolidate.
    pub fn run(&self) -> Result<PipelineOutput> {
        let extraction = self.extract()?;
        let schema = consolidate(&extraction.registry, &self.config.generated_by);
        log::info!("consolidated {} entit(ies)", schema.len());
        Ok(PipelineOutput { extraction, schema })
    }
}
