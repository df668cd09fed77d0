// crates/benchmarker-cli/src/main.rs
// ============================================================================
// Module: Benchmarker CLI Entry Point
// Description: Command dispatcher for the run set ingest service.
// Purpose: Serve HTTP, validate configuration, and import reference data.
// Dependencies: clap, benchmarker-config, benchmarker-http, thiserror, tokio
// ============================================================================

//! ## Overview
//! `benchmarker serve` runs the ingest server, `benchmarker config validate`
//! checks a configuration file, and `benchmarker catalog import` loads a
//! reference data seed into the store. Errors go to stderr with a failure
//! exit code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use benchmarker_config::BenchmarkerConfig;
use benchmarker_config::config_toml_example;
use benchmarker_config::load_reference_data;
use benchmarker_config::seed_toml_example;
use benchmarker_http::IngestServer;
use benchmarker_http::ServerError;
use benchmarker_store_sqlite::SqliteStore;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "benchmarker", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the ingest HTTP server.
    Serve(ConfigArgs),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Reference catalog utilities.
    Catalog {
        /// Selected catalog subcommand.
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

/// Shared `--config` argument.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Path to `benchmarker.toml` (defaults to `BENCHMARKER_CONFIG`, then `./benchmarker.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file.
    Validate(ConfigArgs),
    /// Print a canonical example configuration.
    Example,
}

/// Reference catalog subcommands.
#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Import a reference data seed file into the configured store.
    Import(CatalogImportCommand),
    /// Print a canonical example seed file.
    Example,
}

/// Arguments for `catalog import`.
#[derive(Args, Debug)]
struct CatalogImportCommand {
    /// Path to `benchmarker.toml`.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Reference data seed file (TOML).
    #[arg(long, value_name = "PATH")]
    file: PathBuf,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failures, rendered to stderr.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration could not be loaded or is invalid.
    #[error("Failed to load config: {0}")]
    Config(String),
    /// Seed file could not be loaded or is invalid.
    #[error("Failed to load seed file: {0}")]
    Seed(String),
    /// Store could not be opened or written.
    #[error("Store error: {0}")]
    Store(String),
    /// Server failed to start or stopped with an error.
    #[error("Server error: {0}")]
    Server(#[from] ServerError),
    /// Output could not be written.
    #[error("Failed to write {stream}: {error}")]
    Output {
        /// Stream label.
        stream: &'static str,
        /// Underlying I/O error.
        error: std::io::Error,
    },
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => command_serve(args).await,
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Catalog {
            command,
        } => command_catalog(command),
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(args: ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(&args)?;
    let server = tokio::task::spawn_blocking(move || IngestServer::from_config(&config))
        .await
        .map_err(|err| {
            CliError::Server(ServerError::Init(format!("init join failed: {err}")))
        })??;
    write_stderr_line(&format!("benchmarker listening on {}", server.bind_addr()))?;
    server.serve().await?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(args) => {
            load_config(&args)?;
            write_stdout_line("Config valid")?;
        }
        ConfigCommand::Example => write_stdout(&config_toml_example())?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Loads and validates configuration.
fn load_config(args: &ConfigArgs) -> CliResult<BenchmarkerConfig> {
    BenchmarkerConfig::load(args.config.as_deref()).map_err(|err| CliError::Config(err.to_string()))
}

// ============================================================================
// SECTION: Catalog Commands
// ============================================================================

/// Dispatches catalog subcommands.
fn command_catalog(command: CatalogCommand) -> CliResult<ExitCode> {
    match command {
        CatalogCommand::Import(command) => command_catalog_import(command),
        CatalogCommand::Example => {
            write_stdout(&seed_toml_example())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Imports a seed file into the configured store.
fn command_catalog_import(command: CatalogImportCommand) -> CliResult<ExitCode> {
    let config = load_config(&ConfigArgs {
        config: command.config,
    })?;
    let data = load_reference_data(&command.file).map_err(|err| CliError::Seed(err.to_string()))?;
    let store = SqliteStore::new(&config.store.sqlite_config())
        .map_err(|err| CliError::Store(err.to_string()))?;
    let summary =
        store.import_reference_data(&data).map_err(|err| CliError::Store(err.to_string()))?;
    write_stdout_line(&format!(
        "Imported {} machines, {} products ({} commits), {} benchmarks, {} metrics, {} configs",
        summary.machines,
        summary.products,
        summary.commits,
        summary.benchmarks,
        summary.metrics,
        summary.configs
    ))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes text to stdout as is.
fn write_stdout(text: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes()).map_err(|error| CliError::Output {
        stream: "stdout",
        error,
    })
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|error| CliError::Output {
        stream: "stdout",
        error,
    })
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> CliResult<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}").map_err(|error| CliError::Output {
        stream: "stderr",
        error,
    })
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
    ExitCode::FAILURE
}
