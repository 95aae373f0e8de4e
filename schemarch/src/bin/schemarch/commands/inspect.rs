use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};
use schemarch::{ConsolidatedSchema, Provenance, TableMetadata};
use serde::Serialize;

use super::{InputArgs, run_pipeline};
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, add_table_header, create_table};
use crate::theme::provenance_color;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Inspect",
    commands: &[
        "schemarch inspect                          # One row per consolidated entity",
        "schemarch inspect --entity User            # Columns, relations and operations of User",
        "schemarch --output json inspect            # Machine-readable overview",
    ],
}];

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Show the details of a single normalized entity
    #[arg(long, value_name = "NAME")]
    pub entity: Option<String>,
}

#[derive(Debug, Serialize)]
struct EntityRow {
    entity: String,
    struct_name: String,
    source: Provenance,
    columns: usize,
    relations: usize,
    operations: usize,
}

impl From<&TableMetadata> for EntityRow {
    fn from(table: &TableMetadata) -> Self {
        Self {
            entity: table.normalized_name.clone(),
            struct_name: table.struct_name.clone(),
            source: table.source,
            columns: table.columns.len(),
            relations: table.relations.len(),
            operations: table.operations.len(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EntityOverview {
    generated_by: String,
    entities: Vec<EntityRow>,
}

impl EntityOverview {
    fn new(schema: &ConsolidatedSchema) -> Self {
        Self {
            generated_by: schema.generated_by.clone(),
            entities: schema.entity_list.iter().map(EntityRow::from).collect(),
        }
    }
}

impl TableDisplay for EntityOverview {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = create_table(options);
        add_table_header(options, &mut table, &["Entity", "Struct", "Source", "Columns", "Relations", "Operations"]);

        if self.entities.is_empty() {
            table.add_row(vec![Cell::new("No entities found")]);
            return table;
        }

        for row in &self.entities {
            table.add_row(vec![
                Cell::new(&row.entity),
                Cell::new(&row.struct_name),
                source_cell(options, row.source),
                Cell::new(row.columns),
                Cell::new(row.relations),
                Cell::new(row.operations),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.entities
            .iter()
            .map(|row| format!("{}({})", row.entity, row.columns))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn source_cell(options: &GlobalOptions, source: Provenance) -> Cell {
    let cell = Cell::new(source.as_str());
    if options.no_color { cell } else { cell.fg(provenance_color(source)) }
}

pub fn handle_inspect(args: InspectArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    let run = run_pipeline(&ctx, &args.input, output)?;

    match args.entity.as_deref() {
        None => {
            output.heading("Entities");
            output.display(&EntityOverview::new(&run.schema))
        }
        Some(name) => {
            let Some(table) = run.schema.get(name) else {
                output.error(&format!("Entity '{name}' not found"));
                output.info("Run 'schemarch inspect' to list entity names.");
                anyhow::bail!("Unknown entity {name}");
            };
            if output.is_json() {
                println!("{}", serde_json::to_string_pretty(table)?);
                return Ok(());
            }
            show_entity(table, output);
            Ok(())
        }
    }
}

fn show_entity(table: &TableMetadata, output: &OutputManager) {
    output.heading(&format!("Entity {}", table.normalized_name));
    output.key_value("Struct", &table.struct_name);
    output.key_value("Source", table.source.as_str());

    output.heading("Columns");
    for column in &table.columns {
        let mut line = format!("{}: {}", column.wire_name(), column.type_name);
        if let Some(constraints) = &column.constraints {
            if constraints.required {
                line.push_str(" (required)");
            }
            if constraints.nullable {
                line.push_str(" (nullable)");
            }
        }
        if !column.validation.is_empty() {
            line.push_str(&format!(" [{}]", column.validation));
        }
        output.bullet(&line);
    }

    if !table.relations.is_empty() {
        output.heading("Relations");
        for relation in &table.relations {
            let kind = if relation.is_collection { "1:N" } else { "1:1" };
            output.bullet(&format!(
                "[{kind}] {} -> {} ({}={})",
                relation.field_name, relation.target_struct, relation.target_key, relation.source_key
            ));
        }
    }

    if !table.operations.is_empty() {
        output.heading("Operations");
        for operation in &table.operations {
            output.bullet(&format!("{} {} {}", operation.method, operation.path, operation.operation_id));
        }
    }
}
