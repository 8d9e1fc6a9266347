use std::path::PathBuf;
use std::time::Duration;

use tidyload_core::RunReport;
use tidyload_ingest::DataInfo;
use tidyload_output::{LoadSummary, TableInfo};

/// Everything a finished run reports back to the terminal.
#[derive(Debug)]
pub struct EtlResult {
    pub csv_file: PathBuf,
    pub extraction: DataInfo,
    pub report: RunReport,
    /// `None` for dry runs.
    pub loading: Option<LoadResult>,
    pub events_file: Option<PathBuf>,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct LoadResult {
    pub warehouse_dir: PathBuf,
    pub summary: LoadSummary,
    pub table: Option<TableInfo>,
}
