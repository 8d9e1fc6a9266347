use anyhow::{Context, Result, bail};
use tracing::{debug, info_span};

use tidyload_cli::config::{EtlConfig, Overrides};
use tidyload_cli::etl::{RunOptions, run_etl};
use tidyload_cli::types::EtlResult;
use tidyload_ingest::{ExtractOptions, data_info, preview, read_delimited};

use crate::cli::{InspectArgs, RunArgs};
use crate::summary::print_inspection;

pub fn run_pipeline(args: &RunArgs) -> Result<EtlResult> {
    let mut config = match &args.config {
        Some(path) => EtlConfig::from_path(path)?,
        None => EtlConfig::default(),
    };
    config.apply_overrides(&Overrides {
        csv_file: args.csv_file.clone(),
        warehouse_dir: args.warehouse_dir.clone(),
        table: args.table.clone(),
    });
    let resolved = config.resolve()?;
    debug!(
        csv_file = %resolved.csv_file.display(),
        warehouse_dir = %resolved.warehouse_dir.display(),
        table = %resolved.table,
        dry_run = args.dry_run,
        "configuration resolved"
    );
    run_etl(
        &resolved,
        &RunOptions {
            dry_run: args.dry_run,
            events_file: args.events_file.clone(),
        },
    )
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    if !args.delimiter.is_ascii() {
        bail!(
            "delimiter must be a single ASCII character, got {:?}",
            args.delimiter
        );
    }
    let options = ExtractOptions {
        delimiter: args.delimiter as u8,
        ..ExtractOptions::default()
    }
    .with_parse_dates(&args.parse_dates);
    let extraction = info_span!("inspect", csv_file = %args.csv_file.display())
        .in_scope(|| read_delimited(&args.csv_file, &options))
        .with_context(|| format!("read {}", args.csv_file.display()))?;
    print_inspection(
        &data_info(&extraction.batch),
        &preview(&extraction.batch, args.rows),
    );
    Ok(())
}
