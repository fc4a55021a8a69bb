//! # Transform Subcommands
//!
//! - `satori normalize <schema> <data>`: print the document with defaults
//!   filled in.
//! - `satori simplify <schema> <data>`: print the document with defaults
//!   stripped.
//! - `satori spec <schema>`: print the effective specification.
//! - `satori merge <a> <b>`: print the specification of the combined schema.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use satori_core::Value;
use satori_schema::Schema;

use crate::output::{emit, OutputFormat};
use crate::{load_data, load_schema};

/// Arguments for `satori normalize` and `satori simplify`.
#[derive(Args, Debug)]
pub struct DocumentArgs {
    /// Schema file.
    pub schema: PathBuf,
    /// Document to transform.
    pub data: PathBuf,
}

/// Arguments for `satori spec`.
#[derive(Args, Debug)]
pub struct SpecArgs {
    /// Schema file.
    pub schema: PathBuf,
}

/// Arguments for `satori merge`.
#[derive(Args, Debug)]
pub struct MergeArgs {
    pub first: PathBuf,
    pub second: PathBuf,
}

/// Load the schema and document, apply `transform`, and return the result.
fn transformed(args: &DocumentArgs, transform: fn(&Schema, &Value) -> Value) -> Result<Value> {
    let schema = load_schema(&args.schema)?;
    let data = load_data(&args.data)?;
    Ok(transform(&schema, &data))
}

/// Execute `satori normalize`.
pub fn run_normalize(args: &DocumentArgs, format: OutputFormat) -> Result<u8> {
    let value = transformed(args, Schema::normalize)?;
    emit(&value, format)?;
    Ok(0)
}

/// Execute `satori simplify`.
pub fn run_simplify(args: &DocumentArgs, format: OutputFormat) -> Result<u8> {
    let value = transformed(args, Schema::simplify)?;
    emit(&value, format)?;
    Ok(0)
}

/// Execute `satori spec`.
pub fn run_spec(args: &SpecArgs, format: OutputFormat) -> Result<u8> {
    let schema = load_schema(&args.schema)?;
    emit(&schema.specification(), format)?;
    Ok(0)
}

/// Merge two schema files, returning the combined specification.
pub fn merged_specification(args: &MergeArgs) -> Result<Value> {
    let first = load_schema(&args.first)?;
    let second = load_schema(&args.second)?;
    let merged = first.merge(&second).with_context(|| {
        format!(
            "failed to merge {} with {}",
            args.first.display(),
            args.second.display()
        )
    })?;
    Ok(merged.specification())
}

/// Execute `satori merge`.
pub fn run_merge(args: &MergeArgs, format: OutputFormat) -> Result<u8> {
    emit(&merged_specification(args)?, format)?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    const RECORD: &str = "fields:\n  a: {type: string, required: true}\n  b: {type: integer, default: 0}\n";

    #[test]
    fn normalize_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let args = DocumentArgs {
            schema: write(&dir, "s.yaml", RECORD),
            data: write(&dir, "d.yaml", "a: x\n"),
        };
        let value = transformed(&args, Schema::normalize).unwrap();
        assert_eq!(value, yaml("{a: x, b: 0}"));
        assert_eq!(run_normalize(&args, OutputFormat::Yaml).unwrap(), 0);
    }

    #[test]
    fn simplify_strips_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let args = DocumentArgs {
            schema: write(&dir, "s.yaml", RECORD),
            data: write(&dir, "d.yaml", "{a: x, b: 0}\n"),
        };
        let value = transformed(&args, Schema::simplify).unwrap();
        assert_eq!(value, yaml("{a: x}"));
        assert_eq!(run_simplify(&args, OutputFormat::Json).unwrap(), 0);
    }

    #[test]
    fn merge_combines_constraints() {
        let dir = tempfile::tempdir().unwrap();
        let args = MergeArgs {
            first: write(&dir, "a.yaml", "integer\n"),
            second: write(&dir, "b.yaml", "min: 0\n"),
        };
        assert_eq!(
            merged_specification(&args).unwrap(),
            yaml("{type: integer, min: 0}")
        );
    }

    #[test]
    fn merge_failure_names_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let args = MergeArgs {
            first: write(&dir, "a.yaml", "regex: 'a+'\n"),
            second: write(&dir, "b.yaml", "regex: 'b+'\n"),
        };
        let err = merged_specification(&args).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("a.yaml"));
        assert!(message.contains("different pattern constraints"));
    }

    #[test]
    fn spec_prints_specification() {
        let dir = tempfile::tempdir().unwrap();
        let args = SpecArgs {
            schema: write(&dir, "s.yaml", "[a, b]\n"),
        };
        assert_eq!(run_spec(&args, OutputFormat::Yaml).unwrap(), 0);
    }
}
