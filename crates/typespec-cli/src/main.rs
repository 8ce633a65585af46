use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, Level};
use tracing_subscriber::{filter::Targets, prelude::*, Registry};
use typespec_checker::{
    check_source_with, run_fixture, CheckerConfig, ConfigError, FixtureResult, VerdictReport,
};
use typespec_types::{CheckErrors, TypespecError};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Check annotated Python fixtures against their # OK / # ERR comments."
)]
struct Args {
    /// Fixture files to check.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// JSON container registry used instead of the built-in one.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log to stderr: -v info, -vv debug, -vvv trace.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print verdicts only; do not compare them with expectations.
    #[arg(long)]
    no_expectations: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// What one file produced, in either mode.
#[derive(Serialize)]
#[serde(untagged)]
enum FileReport {
    Fixture(FixtureResult),
    Verdicts {
        file: String,
        syntax_errors: CheckErrors,
        #[serde(skip_serializing_if = "Option::is_none")]
        report: Option<VerdictReport>,
    },
}

impl FileReport {
    fn passed(&self) -> bool {
        match self {
            FileReport::Fixture(result) => result.passed(),
            FileReport::Verdicts { syntax_errors, .. } => !syntax_errors.has_errors(),
        }
    }
}

fn main() {
    let args = Args::parse();
    install_logging(args.verbose);
    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(2);
        }
    }
}

fn install_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(
            Targets::new()
                .with_target("typespec_checker", level)
                .with_target("typespec_cli", level)
                .with_default(Level::ERROR),
        );
    Registry::default().with(fmt_layer).init();
}

/// Returns whether every file passed.
fn run(args: &Args) -> Result<bool, CliError> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => CheckerConfig::default(),
    };

    let mut reports = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let source = fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?;
        let name = path.display().to_string();
        debug!(file = %name, bytes = source.len(), "checking");

        let report = if args.no_expectations {
            let outcome = check_source_with(&source, &name, &config);
            FileReport::Verdicts {
                file: name,
                syntax_errors: outcome.errors,
                report: outcome.report,
            }
        } else {
            FileReport::Fixture(run_fixture(&source, &name, &config))
        };
        reports.push(report);
    }

    match args.format {
        Format::Text => reports.iter().for_each(print_text),
        Format::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    let passed = reports.iter().all(FileReport::passed);
    info!(files = reports.len(), passed, "done");
    Ok(passed)
}

fn load_config(path: &Path) -> Result<CheckerConfig, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    CheckerConfig::from_json(&text).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}

fn print_text(report: &FileReport) {
    match report {
        FileReport::Fixture(result) => {
            print_errors(&result.file, &result.syntax_errors);
            if result.report.is_some() {
                print_errors(&result.file, &result.mismatches);
                println!(
                    "{}: {}/{} expectations met",
                    result.file,
                    result.matched_count(),
                    result.expectations.len()
                );
            }
        }
        FileReport::Verdicts {
            file,
            syntax_errors,
            report,
        } => {
            print_errors(file, syntax_errors);
            for verdict in report.iter().flatten() {
                println!("{file}:{verdict}");
            }
        }
    }
}

fn print_errors(file: &str, errors: &CheckErrors) {
    errors.errors.iter().for_each(|e| print_error(file, e));
    if errors.total_errors > errors.errors.len() {
        println!(
            "{file}: {} more errors not shown",
            errors.total_errors - errors.errors.len()
        );
    }
}

fn print_error(file: &str, error: &TypespecError) {
    println!("{file}:{error}");
    if !error.source_line.is_empty() {
        println!("    | {}", error.source_line);
    }
    if let Some(suggestion) = &error.suggestion {
        println!("    = help: {suggestion}");
    }
}
