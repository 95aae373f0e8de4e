mod commands;
mod context;
mod examples;
mod output;
mod theme;

use anyhow::Result;
use clap::{ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand, error::ErrorKind};
use colored::{Color, Colorize, control::ShouldColorize};
use std::fmt::Write;
use std::io::{self, Write as IoWrite};

use commands::{
    diagram::{DiagramArgs, handle_diagram},
    extract::{ExtractArgs, handle_extract},
    init::{InitArgs, handle_init},
    inspect::{InspectArgs, handle_inspect},
};
use context::CONFIG_FILE;
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ICONS, THEME};

/// Rows of the help appendix shown under `schemarch --help`.
const HELP_APPENDIX: &[(&str, &[(&str, &str)])] = &[
    (
        "Configuration:",
        &[
            (CONFIG_FILE, "Looked up from the current directory upwards"),
            ("--root / --openapi", "Override [scan].root and [openapi].path"),
        ],
    ),
    ("Environment Variables:", &[("RUST_LOG", "Log filter for extraction diagnostics (e.g. warn, debug)")]),
    (
        "Exit Status:",
        &[
            ("0", "Schema extracted (skipped source files are reported, not fatal)"),
            ("1", "Unreadable scan root, malformed OpenAPI document or unwritable output"),
        ],
    ),
];

#[derive(Parser)]
#[command(name = "schemarch")]
#[command(version)]
#[command(
    about = "Logical schema extraction from annotated Rust structs and OpenAPI documents",
    long_about = r#"Logical schema extraction CLI that:

• Parses annotated structs under /model/do and /api paths without compiling them
• Reads OpenAPI 3 component schemas and operations (JSON or YAML)
• Joins both views on a normalized entity name
• Writes one deterministic schema.logical.json for downstream generators

Commands:
  init      Write a default schemarch.toml
  extract   Extract, consolidate and write the schema document
  diagram   Print a Mermaid ER diagram or relation summary
  inspect   Show consolidated entities
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

fn parse_cli() -> Cli {
    let use_color = ShouldColorize::from_env().should_colorize();
    match build_cli_command(use_color).try_get_matches() {
        Ok(matches) => Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit()),
        Err(err) => exit_with_clap_message(err, use_color),
    }
}

/// Print help, version or a usage error framed by blank lines, then exit.
/// A missing subcommand prints the full help to stderr.
fn exit_with_clap_message(err: clap::Error, use_color: bool) -> ! {
    let to_stdout = matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion);
    let exit_code = if to_stdout { 0 } else { err.exit_code() };

    let printed = if err.kind() == ErrorKind::MissingSubcommand {
        let mut stderr = io::stderr();
        writeln!(stderr, "\nerror: 'schemarch' requires a subcommand but one was not provided\n")
            .and_then(|()| build_cli_command(use_color).write_long_help(&mut stderr))
            .and_then(|()| writeln!(stderr))
    } else {
        blank_line(to_stdout).and_then(|()| err.print())
    };
    let _ = blank_line(to_stdout);

    if let Err(print_err) = printed
        && print_err.kind() != io::ErrorKind::BrokenPipe
    {
        eprintln!("Failed to display help: {print_err}");
    }
    std::process::exit(exit_code);
}

fn blank_line(to_stdout: bool) -> io::Result<()> {
    if to_stdout {
        let mut stdout = io::stdout();
        stdout.write_all(b"\n")?;
        stdout.flush()
    } else {
        let mut stderr = io::stderr();
        stderr.write_all(b"\n")?;
        stderr.flush()
    }
}

fn build_cli_command(use_color: bool) -> Command {
    let mut command = Cli::command()
        .styles(THEME.help_styles())
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never })
        .after_long_help(render_appendix(use_color));

    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            *subcommand = subcommand.clone().after_long_help(render_examples(example.groups, use_color));
        }
    }
    command
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let mut buffer = format!("{}\n", paint("Examples:", THEME.progress, true, use_color));
    let sections: Vec<String> = groups
        .iter()
        .map(|group| {
            let mut section = format!("  {}\n", paint(group.title, THEME.heading, true, use_color));
            for command in group.commands {
                let _ = writeln!(
                    section,
                    "    {} {}",
                    paint(ICONS.arrow, THEME.command, false, use_color),
                    paint(command, THEME.command, false, use_color)
                );
            }
            section
        })
        .collect();
    buffer.push_str(&sections.join("\n"));
    buffer
}

fn render_appendix(use_color: bool) -> String {
    let mut buffer = String::new();
    for (title, rows) in HELP_APPENDIX {
        let _ = writeln!(buffer, "{}", paint(title, THEME.progress, true, use_color));
        let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        for (key, description) in *rows {
            let padded = format!("{key:<width$}");
            let _ = writeln!(
                buffer,
                "  {}  {}",
                paint(&padded, THEME.key, true, use_color),
                paint(description, THEME.value, false, use_color)
            );
        }
        buffer.push('\n');
    }
    let _ = writeln!(
        buffer,
        "{} {}",
        paint("Tip:", THEME.progress, true, use_color),
        paint("'schemarch <command> --help' lists examples for each command.", THEME.command, false, use_color)
    );
    buffer
}

fn paint(text: &str, color: Color, bold: bool, use_color: bool) -> String {
    match (use_color, bold) {
        (false, _) => text.to_string(),
        (true, false) => text.color(color).to_string(),
        (true, true) => text.color(color).bold().to_string(),
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default schemarch.toml in the current directory
    Init(InitArgs),

    /// Extract, consolidate and write the logical schema document
    Extract(ExtractArgs),

    /// Print a Mermaid ER diagram or a relation summary
    Diagram(DiagramArgs),

    /// Show consolidated entities
    Inspect(InspectArgs),
}

fn main() {
    env_logger::init();

    let cli = parse_cli();

    match execute(cli) {
        Ok(()) => {}
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    let global_options = GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    if global_options.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(global_options);

    match cli.command {
        Commands::Init(args) => handle_init(args, &output),
        Commands::Extract(args) => handle_extract(args, &output),
        Commands::Diagram(args) => handle_diagram(args, &output),
        Commands::Inspect(args) => handle_inspect(args, &output),
    }
}
