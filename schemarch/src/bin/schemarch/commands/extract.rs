use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use schemarch::{EntityLabel, render_er_diagram, write_atomic, write_json_atomic};
use serde::Serialize;
use std::path::PathBuf;

use super::{InputArgs, run_pipeline};
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, add_table_header, create_table};
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Extract",
        commands: &[
            "schemarch extract                                   # Use schemarch.toml settings",
            "schemarch extract --root internal --openapi api.yaml",
            "schemarch extract --out build/schema.logical.json --raw-out build/raw.json",
        ],
    },
    ExampleGroup {
        title: "Diagram",
        commands: &[
            "schemarch extract --diagram-out docs/er.mmd         # Also write the Mermaid ER diagram",
            "schemarch extract --no-diagram                      # Skip the diagram even if configured",
        ],
    },
];

#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Consolidated output document (default schema.logical.json)
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Also write the per-source registry before consolidation
    #[arg(long, value_name = "FILE")]
    pub raw_out: Option<PathBuf>,

    /// Write the Mermaid ER diagram of the consolidated entities
    #[arg(long, value_name = "FILE")]
    pub diagram_out: Option<PathBuf>,

    /// Do not write a diagram
    #[arg(long)]
    pub no_diagram: bool,
}

/// What an extract run produced
#[derive(Debug, Serialize)]
struct ExtractSummary {
    files_scanned: usize,
    files_skipped: usize,
    source_tables: usize,
    openapi_tables: usize,
    entities: usize,
    written: Vec<String>,
}

impl TableDisplay for ExtractSummary {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = create_table(options);
        add_table_header(options, &mut table, &["Item", "Count"]);
        for (label, value) in [
            ("Source files parsed", self.files_scanned),
            ("Source files skipped", self.files_skipped),
            ("Source tables", self.source_tables),
            ("OpenAPI tables", self.openapi_tables),
            ("Entities", self.entities),
        ] {
            table.add_row(vec![Cell::new(label), Cell::new(value)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!(
            "entities={} source_tables={} openapi_tables={} skipped={}",
            self.entities, self.source_tables, self.openapi_tables, self.files_skipped
        )
    }
}

pub fn handle_extract(args: ExtractArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    let settings = ctx.settings();

    output.heading("Extract Schema");
    let run = run_pipeline(&ctx, &args.input, output)?;

    let out = args
        .out
        .or_else(|| ctx.resolve(&settings.output.out))
        .context("No output file configured")?;
    let raw_out = args.raw_out.or_else(|| ctx.resolve(&settings.output.raw_out));
    let diagram_out = if args.no_diagram {
        None
    } else {
        args.diagram_out.or_else(|| ctx.resolve(&settings.output.diagram_out))
    };

    let mut written = Vec::new();

    if let Some(raw_out) = raw_out {
        write_json_atomic(&raw_out, &run.extraction.registry)
            .with_context(|| format!("Failed to write {}", raw_out.display()))?;
        written.push(raw_out.display().to_string());
    }

    write_json_atomic(&out, &run.schema).with_context(|| format!("Failed to write {}", out.display()))?;
    written.push(out.display().to_string());

    if let Some(diagram_out) = diagram_out {
        let diagram = render_er_diagram(&run.schema.entity_list, EntityLabel::NormalizedName);
        write_atomic(&diagram_out, diagram.as_bytes())
            .with_context(|| format!("Failed to write {}", diagram_out.display()))?;
        written.push(diagram_out.display().to_string());
    }

    let stats = &run.extraction.source_stats;
    let summary = ExtractSummary {
        files_scanned: stats.files_scanned,
        files_skipped: stats.files_skipped,
        source_tables: stats.tables_found,
        openapi_tables: run.extraction.openapi_tables,
        entities: run.schema.len(),
        written,
    };

    output.display(&summary)?;
    if !output.is_json() {
        for path in &summary.written {
            output.indented(ICONS.file, path);
        }
        output.success(&format!("Consolidated {} entities", summary.entities));
    }

    Ok(())
}
