//! Extract, transform and load phases of one run.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use tidyload_core::{Tee, TracingSink, TransformPipeline};
use tidyload_ingest::{data_info, read_delimited};
use tidyload_model::{PipelineEvent, RecordBatch, RecordingSink};
use tidyload_output::{LocalWarehouse, WarehouseLoader};

use crate::config::ResolvedConfig;
use crate::types::{EtlResult, LoadResult};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Transform without touching the warehouse.
    pub dry_run: bool,
    /// Write every pipeline event to this file as JSON.
    pub events_file: Option<PathBuf>,
}

pub fn run_etl(config: &ResolvedConfig, options: &RunOptions) -> Result<EtlResult> {
    let started = Instant::now();
    let run_span = info_span!("etl", table = %config.table);
    let _run_guard = run_span.enter();

    // =========================================================================
    // Extract
    // =========================================================================
    let extract_start = Instant::now();
    let extraction = info_span!("extract", csv_file = %config.csv_file.display())
        .in_scope(|| read_delimited(&config.csv_file, &config.extract))
        .with_context(|| format!("extract {}", config.csv_file.display()))?;
    let extraction_info = data_info(&extraction.batch);
    info!(
        rows = extraction.row_count,
        columns = extraction.column_count,
        duplicate_rows = extraction_info.duplicate_rows,
        duration_ms = extract_start.elapsed().as_millis(),
        "extraction complete"
    );

    // =========================================================================
    // Transform
    // =========================================================================
    let pipeline = TransformPipeline::new(config.transform.clone());
    let mut recorder = RecordingSink::new();
    let output = info_span!("transform")
        .in_scope(|| pipeline.run(extraction.batch, &mut Tee(TracingSink, &mut recorder)))
        .context("transform batch")?;
    info!(
        rows_in = output.report.initial_rows,
        rows_out = output.report.final_rows,
        rows_removed = output.report.rows_removed,
        data_quality_score = output.report.data_quality_score,
        "transformation complete"
    );
    if let Some(path) = &options.events_file {
        write_events(path, recorder.events())?;
    }

    // =========================================================================
    // Load
    // =========================================================================
    let loading = if options.dry_run {
        info!("dry run, skipping load");
        None
    } else {
        let load_start = Instant::now();
        let result = info_span!("load", warehouse_dir = %config.warehouse_dir.display())
            .in_scope(|| load(config, &output.batch))?;
        info!(
            rows_loaded = result.summary.rows_loaded,
            total_rows = result.summary.total_rows,
            duration_ms = load_start.elapsed().as_millis(),
            "loading complete"
        );
        Some(result)
    };

    info!(duration_ms = started.elapsed().as_millis(), "run complete");
    Ok(EtlResult {
        csv_file: config.csv_file.clone(),
        extraction: extraction_info,
        report: output.report,
        loading,
        events_file: options.events_file.clone(),
        elapsed: started.elapsed(),
    })
}

fn load(config: &ResolvedConfig, batch: &RecordBatch) -> Result<LoadResult> {
    let warehouse = LocalWarehouse::open(config.warehouse_dir.clone())
        .with_context(|| format!("open warehouse {}", config.warehouse_dir.display()))?;
    let summary = warehouse
        .load(batch, &config.table, config.load)
        .with_context(|| format!("load table {}", config.table))?;
    let table = warehouse
        .table_info(&config.table)
        .with_context(|| format!("read table info for {}", config.table))?;
    Ok(LoadResult {
        warehouse_dir: config.warehouse_dir.clone(),
        summary,
        table,
    })
}

fn write_events(path: &Path, events: &[PipelineEvent]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), events)
        .with_context(|| format!("write events to {}", path.display()))
}
