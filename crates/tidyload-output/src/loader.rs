//! Directory-backed warehouse tables.
//!
//! Each table lives in two files under the warehouse root:
//!
//! - `<table>.csv` - the rows, written through a polars `DataFrame`
//! - `<table>.schema.json` - schema, row count and timestamps

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use polars::prelude::{CsvReadOptions, CsvWriter, DataFrame, SerReader, SerWriter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tidyload_model::{RecordBatch, TIMESTAMP_FORMAT};

use crate::error::{LoadError, Result};
use crate::frame::batch_to_frame;
use crate::prepare::prepare_for_load;
use crate::schema::WarehouseSchema;

/// How a load treats rows already in the target table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteDisposition {
    /// Replace the table contents.
    #[default]
    Truncate,
    /// Add rows after the existing ones.
    Append,
    /// Write only if the table holds no rows.
    Empty,
}

impl WriteDisposition {
    pub fn as_str(self) -> &'static str {
        match self {
            WriteDisposition::Truncate => "truncate",
            WriteDisposition::Append => "append",
            WriteDisposition::Empty => "empty",
        }
    }
}

impl fmt::Display for WriteDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub disposition: WriteDisposition,
    /// Create the table when it does not exist yet.
    pub create_table: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            disposition: WriteDisposition::default(),
            create_table: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub table: String,
    pub rows_loaded: usize,
    /// Rows in the table after the load.
    pub total_rows: usize,
    pub disposition: WriteDisposition,
    pub created: bool,
}

/// Metadata of a stored table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub table: String,
    pub num_rows: usize,
    pub num_bytes: u64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub schema: WarehouseSchema,
    pub description: String,
}

/// Destination for transformed batches.
pub trait WarehouseLoader {
    fn load(&self, batch: &RecordBatch, table: &str, options: LoadOptions) -> Result<LoadSummary>;

    /// `None` when the table does not exist.
    fn table_info(&self, table: &str) -> Result<Option<TableInfo>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableDescriptor {
    schema: WarehouseSchema,
    num_rows: usize,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    description: String,
}

#[derive(Debug, Clone)]
pub struct LocalWarehouse {
    root: PathBuf,
}

impl LocalWarehouse {
    /// Open a warehouse rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| LoadError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.csv"))
    }

    fn descriptor_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.schema.json"))
    }

    /// Read a stored table back, optionally limited to the first `limit` rows.
    pub fn read_table(&self, table: &str, limit: Option<usize>) -> Result<DataFrame> {
        validate_table_name(table)?;
        let path = self.data_path(table);
        if !path.is_file() {
            return Err(LoadError::TableNotFound {
                table: table.to_string(),
            });
        }
        let frame_error = |source| LoadError::Frame {
            table: table.to_string(),
            source,
        };
        CsvReadOptions::default()
            .with_has_header(true)
            .with_n_rows(limit)
            .try_into_reader_with_file_path(Some(path))
            .map_err(frame_error)?
            .finish()
            .map_err(frame_error)
    }

    fn read_descriptor(&self, table: &str) -> Result<Option<TableDescriptor>> {
        let path = self.descriptor_path(table);
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| LoadError::Descriptor { path, source })
    }

    fn write_descriptor(&self, table: &str, descriptor: &TableDescriptor) -> Result<()> {
        let path = self.descriptor_path(table);
        let json = serde_json::to_string_pretty(descriptor).map_err(|source| {
            LoadError::Descriptor {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&path, json).map_err(|source| LoadError::Io { path, source })
    }

    fn write_rows(&self, table: &str, frame: &mut DataFrame, append: bool) -> Result<()> {
        let path = self.data_path(table);
        let file = if append {
            OpenOptions::new().append(true).open(&path)
        } else {
            File::create(&path)
        }
        .map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        CsvWriter::new(file)
            .include_header(!append)
            .with_datetime_format(Some(TIMESTAMP_FORMAT.to_string()))
            .finish(frame)
            .map_err(|source| LoadError::Frame {
                table: table.to_string(),
                source,
            })
    }
}

impl WarehouseLoader for LocalWarehouse {
    fn load(&self, batch: &RecordBatch, table: &str, options: LoadOptions) -> Result<LoadSummary> {
        validate_table_name(table)?;
        let prepared = prepare_for_load(batch.clone());
        let schema = WarehouseSchema::from_batch(&prepared);
        let existing = self.read_descriptor(table)?;
        if existing.is_none() && !options.create_table {
            return Err(LoadError::TableNotFound {
                table: table.to_string(),
            });
        }

        let now = Utc::now();
        let rows = prepared.height();
        let created = existing.is_none();
        let (append, descriptor) = match existing {
            None => {
                info!(table = %table, columns = schema.len(), "creating table");
                (
                    false,
                    TableDescriptor {
                        schema,
                        num_rows: rows,
                        created: now,
                        modified: now,
                        description: format!("Table created by tidyload on {now}"),
                    },
                )
            }
            Some(current) => match options.disposition {
                WriteDisposition::Empty if current.num_rows > 0 => {
                    return Err(LoadError::TableNotEmpty {
                        table: table.to_string(),
                        rows: current.num_rows,
                    });
                }
                WriteDisposition::Append if current.schema != schema => {
                    return Err(LoadError::SchemaMismatch {
                        table: table.to_string(),
                    });
                }
                WriteDisposition::Append => (
                    true,
                    TableDescriptor {
                        num_rows: current.num_rows + rows,
                        modified: now,
                        ..current
                    },
                ),
                WriteDisposition::Truncate | WriteDisposition::Empty => (
                    false,
                    TableDescriptor {
                        schema,
                        num_rows: rows,
                        modified: now,
                        ..current
                    },
                ),
            },
        };

        debug!(table = %table, rows, disposition = %options.disposition, "writing rows");
        let mut frame = batch_to_frame(&prepared).map_err(|source| LoadError::Frame {
            table: table.to_string(),
            source,
        })?;
        self.write_rows(table, &mut frame, append)?;
        self.write_descriptor(table, &descriptor)?;

        info!(
            table = %table,
            rows_loaded = rows,
            total_rows = descriptor.num_rows,
            disposition = %options.disposition,
            "loaded rows"
        );
        Ok(LoadSummary {
            table: table.to_string(),
            rows_loaded: rows,
            total_rows: descriptor.num_rows,
            disposition: options.disposition,
            created,
        })
    }

    fn table_info(&self, table: &str) -> Result<Option<TableInfo>> {
        validate_table_name(table)?;
        let Some(descriptor) = self.read_descriptor(table)? else {
            return Ok(None);
        };
        let path = self.data_path(table);
        let num_bytes = fs::metadata(&path)
            .map_err(|source| LoadError::Io { path, source })?
            .len();
        Ok(Some(TableInfo {
            table: table.to_string(),
            num_rows: descriptor.num_rows,
            num_bytes,
            created: descriptor.created,
            modified: descriptor.modified,
            schema: descriptor.schema,
            description: descriptor.description,
        }))
    }
}

fn validate_table_name(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(LoadError::InvalidTableName(table.to_string()))
    }
}
