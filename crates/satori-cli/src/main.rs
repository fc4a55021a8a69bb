//! # satori CLI entry point
//!
//! Parses command-line arguments, installs the log subscriber, and
//! dispatches to the subcommand handlers in `satori_cli`.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use satori_cli::blueprint::{run_blueprint, BlueprintArgs};
use satori_cli::check::{run_subsume, run_validate, SubsumeArgs, ValidateArgs};
use satori_cli::output::OutputFormat;
use satori_cli::transform::{
    run_merge, run_normalize, run_simplify, run_spec, DocumentArgs, MergeArgs, SpecArgs,
};

/// satori: composable schemas for configuration documents.
///
/// Validates documents against schemas, fills in and strips defaults,
/// checks that one schema honors another, and merges schemas.
#[derive(Parser, Debug)]
#[command(name = "satori", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for printed documents and reports.
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a document against a schema.
    Validate(ValidateArgs),

    /// Print a document with defaults filled in.
    Normalize(DocumentArgs),

    /// Print a document with defaults stripped.
    Simplify(DocumentArgs),

    /// Print a schema's effective specification.
    Spec(SpecArgs),

    /// Check that a specific schema is an acceptable narrowing of a general one.
    Subsume(SubsumeArgs),

    /// Print the specification of two schemas combined.
    Merge(MergeArgs),

    /// Print a blueprint skeleton for a record or map schema.
    Blueprint(BlueprintArgs),
}

fn filter_for(verbose: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(filter_for(cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = cli.format;
    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, format),
        Commands::Normalize(args) => run_normalize(args, format),
        Commands::Simplify(args) => run_simplify(args, format),
        Commands::Spec(args) => run_spec(args, format),
        Commands::Subsume(args) => run_subsume(args, format),
        Commands::Merge(args) => run_merge(args, format),
        Commands::Blueprint(args) => run_blueprint(args, format),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
