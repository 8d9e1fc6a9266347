//! Error types for delimited-file extraction.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Path exists but is not a regular file.
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Failed to open or read the file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// File has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// A record has more fields than the header.
    #[error("{path} line {line}: expected {expected} fields, found {found}")]
    TooManyFields {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A column requested for date parsing is not in the header.
    #[error("date column '{column}' not found in {path}")]
    MissingDateColumn { column: String, path: PathBuf },

    #[error(transparent)]
    Batch(#[from] tidyload_model::BatchError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
