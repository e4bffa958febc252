// haul - delivery sheet reconciliation and reporting (headless)

mod aliases;
mod exit_codes;
mod inspect;
mod reconcile;
mod report;
mod util;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use env_logger::Env;
use serde::Serialize;

use haul_io::{ExportError, LoadError, LoadOptions};
use haul_schema::{RawTable, SchemaConfig, SchemaError};

use exit_codes::{EXIT_ERROR, EXIT_EXPORT, EXIT_LOAD, EXIT_SCHEMA, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "haul")]
#[command(about = "Map delivery/sales sheets onto canonical columns and report on them")]
#[command(version)]
struct Cli {
    /// Reconciler config file (TOML)
    #[arg(long, global = true, env = "HAUL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List canonical fields with their labels, defaults and aliases
    #[command(after_help = "\
Examples:
  haul aliases
  haul aliases --config site.toml --json")]
    Aliases {
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show how a sheet's headers map onto canonical fields
    #[command(after_help = "\
Examples:
  haul inspect deliveries.xlsx
  haul inspect deliveries.xlsx --sheet DP --json")]
    Inspect {
        /// Input file (xlsx, xls, xlsb, ods, csv, tsv)
        file: PathBuf,

        /// Worksheet name (defaults to the first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Reconcile a sheet and write the canonical table
    #[command(after_help = "\
Examples:
  haul reconcile deliveries.xlsx -o canonical.xlsx
  haul reconcile export.csv > canonical.csv
  haul reconcile deliveries.xlsx --keep-bad-dates --json")]
    Reconcile {
        /// Input file (xlsx, xls, xlsb, ods, csv, tsv)
        file: PathBuf,

        /// Output file (.xlsx or .csv); CSV to stdout when omitted
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Keep rows whose delivery date cannot be parsed (date left empty)
        #[arg(long)]
        keep_bad_dates: bool,

        /// Worksheet name (defaults to the first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Print the canonical table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Filter reconciled deliveries and print dashboard metrics
    #[command(after_help = "\
Examples:
  haul report deliveries.xlsx
  haul report deliveries.xlsx --from 2024-03-01 --to 2024-03-31 --area Jakarta
  haul report deliveries.xlsx --salesman Ani --salesman Budi --json
  haul report deliveries.xlsx --plant PL-01 --export filtered.xlsx")]
    Report(report::ReportArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Aliases { json } => aliases::cmd_aliases(&config, json),
        Commands::Inspect { file, sheet, json } => inspect::cmd_inspect(&config, &file, sheet, json),
        Commands::Reconcile {
            file,
            output,
            keep_bad_dates,
            sheet,
            json,
        } => reconcile::cmd_reconcile(&config, &file, output.as_deref(), keep_bad_dates, sheet, json),
        Commands::Report(args) => report::cmd_report(&config, args),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Missing required fields exit with the schema code; config problems are usage errors.
    pub fn schema(err: SchemaError) -> Self {
        match err {
            SchemaError::MissingFields { .. } => Self {
                code: EXIT_SCHEMA,
                message: err.to_string(),
                hint: Some(
                    "run `haul inspect FILE` to see the detected headers, or add aliases under [aliases] in the config"
                        .to_string(),
                ),
            },
            SchemaError::ConfigParse(_) | SchemaError::Config(_) => Self::usage(err.to_string()),
        }
    }

    pub fn load(err: LoadError) -> Self {
        let hint = match &err {
            LoadError::Unsupported { .. } => Some("save the sheet as .xlsx or .csv".to_string()),
            LoadError::TooLarge { .. } => Some("raise max_file_bytes in the config".to_string()),
            LoadError::NoHeader(_) => Some("the first non-empty row must hold the column headers".to_string()),
            _ => None,
        };
        Self { code: EXIT_LOAD, message: err.to_string(), hint }
    }

    pub fn export(err: ExportError) -> Self {
        Self { code: EXIT_EXPORT, message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Built-in behaviour when no config file is given.
fn load_config(path: Option<&Path>) -> Result<SchemaConfig, CliError> {
    let Some(path) = path else {
        return Ok(SchemaConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::usage(format!("cannot read config {}: {e}", path.display())))?;
    let config = SchemaConfig::from_toml(&text)
        .map_err(|e| CliError::schema(e).with_hint(format!("check {}", path.display())))?;
    log::info!("loaded config {}", path.display());
    Ok(config)
}

fn load_input(file: &Path, sheet: Option<String>, config: &SchemaConfig) -> Result<RawTable, CliError> {
    let options = LoadOptions {
        sheet,
        max_file_bytes: config.max_file_bytes,
    };
    haul_io::load_table(file, &options).map_err(CliError::load)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}
