//! csv-mssql-migrate CLI - load header-typed delimited files into SQL Server.

use clap::{CommandFactory, Parser};
use csv_mssql_migrate::{
    Config, FileOutcome, MigrateError, MigrationReport, Orchestrator, UpsertStyle, WriteMode,
};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

#[derive(Parser, Debug)]
#[command(name = "csv-mssql-migrate")]
#[command(about = "Load header-typed delimited files into SQL Server tables")]
#[command(version)]
struct Cli {
    /// Insert new keys and update existing ones instead of plain inserts
    #[arg(long)]
    upsert: bool,

    /// Render upserts as a MERGE statement (implies --upsert)
    #[arg(long)]
    merge: bool,

    /// Path to YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Field delimiter (overrides the configuration file)
    #[arg(long)]
    delimiter: Option<char>,

    /// Output JSON report to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Files or directories to migrate, processed in the order given
    paths: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    // Unknown long flags print the help text and are otherwise ignored.
    let (args, unknown) = strip_unknown_flags(std::env::args_os());
    if !unknown.is_empty() {
        print_help();
    }

    let cli = Cli::parse_from(args);

    if cli.paths.is_empty() {
        print_help();
        return Ok(());
    }

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| MigrateError::Config(e.to_string()))?;

    for flag in &unknown {
        warn!("Ignoring unknown option {}", flag);
    }

    let config = load_config(&cli)?;
    let orchestrator = Orchestrator::connect(config)?;

    let cancel_token = setup_signal_handler();

    let report = orchestrator.run(&cli.paths, Some(cancel_token)).await;

    if cli.output_json {
        println!("{}", report.to_json()?);
    } else {
        print_summary(&report);
    }

    // Path, table and record failures are reported above and never change the exit code.
    Ok(())
}

/// Build the effective configuration: file (or defaults), environment, then flags.
fn load_config(cli: &Cli) -> Result<Config, MigrateError> {
    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    }
    .with_env_password();

    if cli.upsert || cli.merge {
        config.migration.mode = WriteMode::Upsert;
    }
    if cli.merge {
        config.migration.upsert_style = UpsertStyle::Merge;
    }
    if let Some(delimiter) = cli.delimiter {
        config.input.delimiter = delimiter;
    }

    config.validate()?;
    Ok(config)
}

/// Split out `--name` tokens that the CLI does not define.
///
/// Everything after a bare `--` is left alone.
fn strip_unknown_flags<I>(args: I) -> (Vec<OsString>, Vec<String>)
where
    I: IntoIterator<Item = OsString>,
{
    let command = Cli::command();
    let mut known: HashSet<String> = command
        .get_arguments()
        .filter_map(|a| a.get_long().map(str::to_string))
        .collect();
    known.insert("help".to_string());
    known.insert("version".to_string());

    let mut kept = Vec::new();
    let mut unknown = Vec::new();
    let mut literal = false;

    for arg in args {
        if !literal {
            if let Some(text) = arg.to_str() {
                if text == "--" {
                    literal = true;
                } else if let Some(name) = text.strip_prefix("--") {
                    let name = name.split('=').next().unwrap_or_default();
                    if !known.contains(name) {
                        unknown.push(text.to_string());
                        continue;
                    }
                }
            }
        }
        kept.push(arg);
    }

    (kept, unknown)
}

fn print_help() {
    let mut command = Cli::command();
    if command.print_help().is_ok() {
        println!();
    }
}

fn print_summary(report: &MigrationReport) {
    let heading = if report.status == "cancelled" {
        "Migration cancelled!"
    } else {
        "Migration completed!"
    };
    println!("\n{}", heading);
    println!("  Run ID: {}", report.run_id);
    println!("  Duration: {:.2}s", report.duration_seconds);
    println!(
        "  Files: {} loaded, {} failed, {} path(s) skipped",
        report.totals.files_succeeded, report.totals.files_failed, report.totals.paths_skipped
    );
    println!(
        "  Records: {} written, {} failed",
        report.totals.records_written, report.totals.records_failed
    );

    for file in report.files.iter().filter(|f| !f.is_clean()) {
        let label = match file.outcome {
            FileOutcome::Success => "record failures",
            FileOutcome::SkippedInvalidPath => "skipped",
            FileOutcome::TableCreateFailed => "table create failed",
            FileOutcome::DecodeFailed => "unreadable",
        };
        println!("  {} ({}): {}", file.path.display(), label, file.error.as_deref().unwrap_or(""));
        for failure in &file.record_failures {
            println!(
                "    record {} (key {:?}): {}",
                failure.index, failure.key, failure.message
            );
        }
    }
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}

/// Setup signal handlers for graceful shutdown.
///
/// Handles SIGINT (Ctrl-C) and SIGTERM. The run stops before the next file;
/// the file in progress is finished.
#[cfg(unix)]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();

    for (kind, name) in [
        (SignalKind::interrupt(), "SIGINT"),
        (SignalKind::terminate(), "SIGTERM"),
    ] {
        let token = cancel_token.clone();
        match signal(kind) {
            Ok(mut stream) => {
                tokio::spawn(async move {
                    stream.recv().await;
                    eprintln!("\nReceived {}. Finishing the current file...", name);
                    token.cancel();
                });
            }
            Err(e) => warn!("Failed to install {} handler: {}", name, e),
        }
    }

    cancel_token
}

/// Setup signal handler for Windows (only Ctrl-C)
#[cfg(not(unix))]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();
    let token = cancel_token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nReceived Ctrl-C. Finishing the current file...");
            token.cancel();
        }
    });

    cancel_token
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_strip_unknown_flags() {
        let (kept, unknown) =
            strip_unknown_flags(os(&["bin", "--upsert", "--frobnicate", "a.csv"]));
        assert_eq!(kept, os(&["bin", "--upsert", "a.csv"]));
        assert_eq!(unknown, vec!["--frobnicate"]);
    }

    #[test]
    fn test_strip_unknown_flags_keeps_values_and_literals() {
        let (kept, unknown) = strip_unknown_flags(os(&[
            "bin",
            "--delimiter=,",
            "--config",
            "c.yaml",
            "--",
            "--weird-name.csv",
        ]));
        assert!(unknown.is_empty());
        assert_eq!(kept.len(), 6);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["bin", "--merge", "--delimiter", ",", "a.csv"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.migration.mode, WriteMode::Upsert);
        assert_eq!(config.migration.upsert_style, UpsertStyle::Merge);
        assert_eq!(config.input.delimiter, ',');
    }

    #[test]
    fn test_cli_defaults_to_insert() {
        let cli = Cli::parse_from(["bin", "a.csv"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.migration.mode, WriteMode::Insert);
        assert_eq!(config.input.delimiter, ';');
    }
}
