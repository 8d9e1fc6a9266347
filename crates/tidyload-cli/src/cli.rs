//! CLI argument definitions for the tidyload runner.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tidyload_cli::logging::LogFormat;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "tidyload",
    version,
    about = "Clean customer CSV data and load it into a warehouse table",
    long_about = "Extract a delimited file, run the fixed cleaning pipeline \
                  (missing values, deduplication, text normalization, email and \
                  phone validation, type coercion, derived fields, business rules) \
                  and load the result into a local warehouse table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run extraction, transformation and loading.
    Run(RunArgs),

    /// Show the inferred schema and a preview of a CSV file.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Configuration file (.toml or .json).
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// CSV file to extract (overrides the config file).
    #[arg(long = "csv-file", value_name = "PATH")]
    pub csv_file: Option<PathBuf>,

    /// Warehouse directory (overrides the config file).
    #[arg(long = "warehouse-dir", value_name = "DIR")]
    pub warehouse_dir: Option<PathBuf>,

    /// Target table (overrides the config file).
    #[arg(long = "table", value_name = "NAME")]
    pub table: Option<String>,

    /// Transform and report without loading.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write every pipeline event to a JSON file.
    #[arg(long = "events-file", value_name = "PATH")]
    pub events_file: Option<PathBuf>,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// CSV file to inspect.
    #[arg(value_name = "CSV")]
    pub csv_file: PathBuf,

    /// Rows to show from the start and the end.
    #[arg(long = "rows", value_name = "N", default_value_t = 5)]
    pub rows: usize,

    /// Field delimiter.
    #[arg(long = "delimiter", value_name = "CHAR", default_value_t = ',')]
    pub delimiter: char,

    /// Columns to parse as dates.
    #[arg(long = "parse-dates", value_name = "COLUMN", value_delimiter = ',')]
    pub parse_dates: Vec<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
