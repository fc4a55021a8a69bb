//! `satori blueprint <schema> [--key PATH ...]`: populate a blueprint
//! along the given dotted key paths and print the resulting skeleton.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use satori_core::Value;
use satori_schema::Blueprint;

use crate::load_schema;
use crate::output::{emit, OutputFormat};

/// Arguments for `satori blueprint`.
#[derive(Args, Debug)]
pub struct BlueprintArgs {
    /// Schema file; must describe a record or a map.
    pub schema: PathBuf,

    /// Dotted key path to populate, e.g. `limits` or `groups.main`.
    /// Repeatable.
    #[arg(long = "key", value_name = "PATH")]
    pub keys: Vec<String>,
}

/// Walk `path` from `root`, synthesizing each node on the way.
fn populate(root: &mut Blueprint, path: &str) -> Result<()> {
    let mut node = root;
    for key in path.split('.').filter(|k| !k.is_empty()) {
        node = node
            .node(key)
            .map_err(|e| anyhow!("cannot populate '{path}': {e}"))?;
    }
    Ok(())
}

/// Build the skeleton for `args`.
pub fn build(args: &BlueprintArgs) -> Result<Value> {
    let schema = load_schema(&args.schema)?;
    let mut blue = schema
        .blueprint()
        .map_err(|e| anyhow!("{}: {e}", args.schema.display()))?;
    for path in &args.keys {
        populate(&mut blue, path)?;
    }
    Ok(blue.to_value())
}

/// Execute `satori blueprint`.
pub fn run_blueprint(args: &BlueprintArgs, format: OutputFormat) -> Result<u8> {
    emit(&build(args)?, format)?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write;

    const SCHEMA: &str = "\
fields:
  limits:
    fields:
      time: integer
  groups:
    value:
      fields:
        points: integer
  name: string
";

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn populates_requested_paths() {
        let dir = tempfile::tempdir().unwrap();
        let args = BlueprintArgs {
            schema: write(&dir, "s.yaml", SCHEMA),
            keys: vec!["limits".into(), "groups.main".into()],
        };
        assert_eq!(build(&args).unwrap(), yaml("{limits: {}, groups: {main: {}}}"));
    }

    #[test]
    fn scalar_field_cannot_be_populated() {
        let dir = tempfile::tempdir().unwrap();
        let args = BlueprintArgs {
            schema: write(&dir, "s.yaml", SCHEMA),
            keys: vec!["name".into()],
        };
        let err = build(&args).unwrap_err();
        assert!(err.to_string().contains("cannot populate 'name'"));
    }

    #[test]
    fn non_structural_schema_has_no_blueprint() {
        let dir = tempfile::tempdir().unwrap();
        let args = BlueprintArgs {
            schema: write(&dir, "s.yaml", "integer\n"),
            keys: Vec::new(),
        };
        let err = build(&args).unwrap_err();
        assert!(err.to_string().contains("No blueprint available"));
    }
}
