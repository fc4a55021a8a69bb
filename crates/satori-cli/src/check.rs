//! # Check Subcommands
//!
//! `satori validate` checks a document against a schema; `satori subsume`
//! checks that one schema is an acceptable narrowing of another. Both exit
//! 0 on success and 1 when violations were found, printing one violation
//! per line (or a JSON report with `--format json`).

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use satori_schema::ValidationError;

use crate::output::OutputFormat;
use crate::{load_data, load_schema};

/// Arguments for `satori validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema file.
    pub schema: PathBuf,
    /// Document to check.
    pub data: PathBuf,
}

/// Arguments for `satori subsume`.
#[derive(Args, Debug)]
pub struct SubsumeArgs {
    /// The schema acting as the contract.
    pub general: PathBuf,
    /// The schema that must honor it.
    pub specific: PathBuf,
}

#[derive(Serialize)]
struct Report<'a> {
    valid: bool,
    errors: &'a [ValidationError],
}

/// Format a check result. `summary` is printed when there are no errors.
pub fn report(errors: &[ValidationError], summary: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let report = Report {
                valid: errors.is_empty(),
                errors,
            };
            Ok(format!("{}\n", serde_json::to_string_pretty(&report)?))
        }
        OutputFormat::Yaml if errors.is_empty() => Ok(format!("{summary}\n")),
        OutputFormat::Yaml => Ok(errors.iter().map(|e| format!("{e}\n")).collect()),
    }
}

/// Execute `satori validate`.
pub fn run_validate(args: &ValidateArgs, format: OutputFormat) -> Result<u8> {
    let schema = load_schema(&args.schema)?;
    let data = load_data(&args.data)?;
    let errors = match schema.validate(&data) {
        Ok(()) => Vec::new(),
        Err(failed) => failed.0.into_inner(),
    };
    tracing::info!(
        data = %args.data.display(),
        violations = errors.len(),
        "validated document"
    );
    print!("{}", report(&errors, "valid", format)?);
    Ok(u8::from(!errors.is_empty()))
}

/// Execute `satori subsume`.
pub fn run_subsume(args: &SubsumeArgs, format: OutputFormat) -> Result<u8> {
    let general = load_schema(&args.general)?;
    let specific = load_schema(&args.specific)?;
    let errors = match general.validate_schema(&specific) {
        Ok(()) => Vec::new(),
        Err(err) => err.details().to_vec(),
    };
    print!("{}", report(&errors, "subsumed", format)?);
    Ok(u8::from(!errors.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write;

    #[test]
    fn valid_document_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let args = ValidateArgs {
            schema: write(&dir, "s.yaml", "{type: integer, min: 0, max: 10}\n"),
            data: write(&dir, "d.yaml", "5\n"),
        };
        assert_eq!(run_validate(&args, OutputFormat::Yaml).unwrap(), 0);
    }

    #[test]
    fn invalid_document_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let args = ValidateArgs {
            schema: write(&dir, "s.yaml", "fields: {a: {type: string, required: true}}\n"),
            data: write(&dir, "d.yaml", "{}\n"),
        };
        assert_eq!(run_validate(&args, OutputFormat::Json).unwrap(), 1);
    }

    #[test]
    fn broken_schema_is_an_error_not_a_violation() {
        let dir = tempfile::tempdir().unwrap();
        let args = ValidateArgs {
            schema: write(&dir, "s.yaml", "{fields: {}, item: integer}\n"),
            data: write(&dir, "d.yaml", "{}\n"),
        };
        assert!(run_validate(&args, OutputFormat::Yaml).is_err());
    }

    #[test]
    fn subsume_reports_weaker_schema() {
        let dir = tempfile::tempdir().unwrap();
        let args = SubsumeArgs {
            general: write(&dir, "g.yaml", "{type: integer, min: 0}\n"),
            specific: write(&dir, "s.yaml", "integer\n"),
        };
        assert_eq!(run_subsume(&args, OutputFormat::Yaml).unwrap(), 1);
        let narrower = SubsumeArgs {
            general: args.general.clone(),
            specific: write(&dir, "n.yaml", "{type: integer, min: 5}\n"),
        };
        assert_eq!(run_subsume(&narrower, OutputFormat::Yaml).unwrap(), 0);
    }

    #[test]
    fn report_lists_violations_one_per_line() {
        let errors = vec![
            ValidationError::new("value required but not provided", ".a"),
            ValidationError::new("bad", ""),
        ];
        let out = report(&errors, "valid", OutputFormat::Yaml).unwrap();
        assert_eq!(out, ".a: value required but not provided\n(root): bad\n");
        assert_eq!(report(&[], "valid", OutputFormat::Yaml).unwrap(), "valid\n");
    }

    #[test]
    fn json_report_carries_paths() {
        let errors = vec![ValidationError::new("m", ".p")];
        let out = report(&errors, "valid", OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["valid"], false);
        assert_eq!(parsed["errors"][0]["path"], ".p");
    }
}
