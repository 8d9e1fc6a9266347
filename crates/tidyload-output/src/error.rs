//! Error types for warehouse loading.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    // === Table Errors ===
    #[error("invalid table name {0:?}: use letters, digits and underscores")]
    InvalidTableName(String),

    #[error("table {table} does not exist and table creation is disabled")]
    TableNotFound { table: String },

    /// `empty` disposition against a table that already holds rows.
    #[error("table {table} already contains {rows} rows")]
    TableNotEmpty { table: String, rows: usize },

    #[error("schema of the batch does not match table {table}")]
    SchemaMismatch { table: String },

    // === Storage Errors ===
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid table descriptor {path}: {source}")]
    Descriptor {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write table {table}: {source}")]
    Frame {
        table: String,
        #[source]
        source: PolarsError,
    },
}

pub type Result<T> = std::result::Result<T, LoadError>;
