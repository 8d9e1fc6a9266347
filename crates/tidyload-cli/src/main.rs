//! tidyload command line runner.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tidyload_cli::logging::{LogConfig, init_logging};

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command};
use crate::commands::{run_inspect, run_pipeline};
use crate::summary::print_summary;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&log_config(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => print_summary(&run_pipeline(&args)?),
        Command::Inspect(args) => run_inspect(&args)?,
    }
    Ok(())
}

/// An explicit `--log-level` wins over `-v`/`-q`; either one disables `RUST_LOG`.
fn log_config(cli: &Cli) -> LogConfig {
    let level_filter = cli
        .log_level
        .map_or_else(|| cli.verbosity.tracing_level_filter(), Into::into);
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig {
        level_filter,
        use_env_filter: !(cli.verbosity.is_present() || cli.log_level.is_some()),
        with_ansi,
        format: cli.log_format.into(),
        log_file: cli.log_file.clone(),
        ..LogConfig::default()
    }
}
