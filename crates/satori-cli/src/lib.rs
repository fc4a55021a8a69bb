//! # satori-cli — Command-Line Front End
//!
//! Provides the `satori` binary. Every subcommand loads a schema (and,
//! where relevant, a data document) from YAML files and runs one engine
//! operation:
//!
//! ```bash
//! satori validate schema.yaml config.yaml
//! satori normalize schema.yaml config.yaml --format json
//! satori subsume contract.yaml schema.yaml
//! satori blueprint schema.yaml --key limits
//! ```
//!
//! Handlers return the process exit code; `main` only maps errors.

pub mod blueprint;
pub mod check;
pub mod output;
pub mod transform;

use std::path::Path;

use anyhow::{Context, Result};
use satori_core::{text, Value};
use satori_schema::Schema;

/// Load and compose a schema from a YAML file holding the raw spec.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let spec = text::load_file(path)?;
    let schema = Schema::try_from(spec)
        .with_context(|| format!("invalid schema: {}", path.display()))?;
    tracing::debug!(path = %path.display(), facets = ?schema.facets(), "loaded schema");
    Ok(schema)
}

/// Load a data document.
pub fn load_data(path: &Path) -> Result<Value> {
    Ok(text::load_file(path)?)
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::path::PathBuf;

    use tempfile::TempDir;

    /// Write `content` to `name` inside `dir`, returning the path.
    pub fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }
}
