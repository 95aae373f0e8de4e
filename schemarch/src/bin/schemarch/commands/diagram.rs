use anyhow::Result;
use clap::Args;
use schemarch::{EntityLabel, render_er_diagram, render_relation_summary};

use super::{InputArgs, run_pipeline};
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Diagram",
    commands: &[
        "schemarch diagram                          # Per-struct Mermaid ER diagram",
        "schemarch diagram --consolidated           # One node per logical entity",
        "schemarch diagram --summary                # Relation listing instead of Mermaid",
        "schemarch diagram -q > er.mmd              # Diagram text only",
    ],
}];

#[derive(Args, Debug)]
pub struct DiagramArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Draw consolidated entities instead of individual structs
    #[arg(long)]
    pub consolidated: bool,

    /// Print the relation summary instead of the Mermaid diagram
    #[arg(long)]
    pub summary: bool,
}

pub fn handle_diagram(args: DiagramArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    let run = run_pipeline(&ctx, &args.input, output)?;

    let text = match (args.summary, args.consolidated) {
        (true, true) => render_relation_summary(&run.schema.entity_list),
        (true, false) => render_relation_summary(run.extraction.registry.tables()),
        (false, true) => render_er_diagram(&run.schema.entity_list, EntityLabel::NormalizedName),
        (false, false) => render_er_diagram(run.extraction.registry.tables(), EntityLabel::StructName),
    };

    // Printed even with --quiet.
    print!("{text}");
    if !text.ends_with('\n') {
        println!();
    }

    Ok(())
}
