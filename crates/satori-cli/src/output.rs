//! Output formatting shared by the subcommands.

use anyhow::Result;
use clap::ValueEnum;
use satori_core::{text, Value};

/// How documents are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Render a document, always ending in a single newline.
pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    let mut rendered = match format {
        OutputFormat::Yaml => text::render(value)?,
        OutputFormat::Json => text::render_json(value)?,
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}

/// Print a document to stdout.
pub fn emit(value: &Value, format: OutputFormat) -> Result<()> {
    print!("{}", render(value, format)?);
    Ok(())
}
