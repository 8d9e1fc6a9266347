use thiserror::Error;

/// Structural defects of a [`RecordBatch`](crate::RecordBatch).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("column {column} received {found} values, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("row mask has {found} entries, expected {expected}")]
    MaskLength { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, BatchError>;
