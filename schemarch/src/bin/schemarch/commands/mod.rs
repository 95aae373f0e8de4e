pub mod diagram;
pub mod extract;
pub mod init;
pub mod inspect;

use anyhow::{Context, Result};
use clap::Args;
use schemarch::{Pipeline, PipelineOutput};
use std::path::PathBuf;

use crate::context::{InputOverrides, ProjectContext};
use crate::output::OutputManager;
use crate::theme::ICONS;

/// Input flags shared by every command that runs the extractors
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Directory to scan for annotated structs (default from schemarch.toml, else ./src)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// OpenAPI 3 document, JSON or YAML
    #[arg(long, value_name = "FILE")]
    pub openapi: Option<PathBuf>,
}

impl From<&InputArgs> for InputOverrides {
    fn from(args: &InputArgs) -> Self {
        Self {
            root: args.root.clone(),
            openapi: args.openapi.clone(),
        }
    }
}

/// Run extraction and consolidation, reporting progress through `output`.
pub fn run_pipeline(ctx: &ProjectContext, input: &InputArgs, output: &OutputManager) -> Result<PipelineOutput> {
    let pipeline = Pipeline::new(ctx.pipeline_config(&input.into()));
    output.verbose(&format!("Scan root: {}", pipeline.config().scan_root.display()));
    if let Some(openapi) = &pipeline.config().openapi {
        output.verbose(&format!("OpenAPI document: {}", openapi.display()));
    }

    output.progress("Extracting schema");
    let result = pipeline.run();
    output.clear_line();

    let run = result.context("Schema extraction failed")?;
    let stats = &run.extraction.source_stats;
    if stats.files_skipped > 0 {
        output.warning(&format!("{} source file(s) could not be parsed and were skipped", stats.files_skipped));
        for skipped in &stats.skipped {
            output.indented(ICONS.arrow, &format!("{}: {}", skipped.relative_path, skipped.reason));
        }
    }
    Ok(run)
}
