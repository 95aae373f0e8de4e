use anyhow::{Context, Result};
use clap::Args;

use crate::context::{CONFIG_FILE, SchemarchConfig};
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Initialize",
    commands: &[
        "schemarch init                    # Write schemarch.toml with defaults",
        "schemarch init --force            # Overwrite an existing schemarch.toml",
    ],
}];

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing schemarch.toml
    #[arg(long)]
    pub force: bool,
}

pub fn handle_init(args: InitArgs, output: &OutputManager) -> Result<()> {
    output.heading("Initialize schemarch");

    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config_path = current_dir.join(CONFIG_FILE);

    if config_path.exists() && !args.force {
        output.warning(&format!("{CONFIG_FILE} already exists"));
        output.info("Use --force to overwrite it.");
        return Ok(());
    }

    let content = render_default_config()?;
    schemarch::write_atomic(&config_path, content.as_bytes())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    output.success(&format!("Created {CONFIG_FILE}"));
    output.indented(ICONS.file, &config_path.display().to_string());
    output.info("Edit [scan] and [openapi] to point at your sources, then run 'schemarch extract'.");

    Ok(())
}

fn render_default_config() -> Result<String> {
    let body = toml::to_string_pretty(&SchemarchConfig::default()).context("Failed to render default config")?;
    Ok(format!("# schemarch configuration\n# Command-line flags override these values.\n\n{body}"))
}
