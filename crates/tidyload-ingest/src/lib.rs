pub mod csv_table;
pub mod error;
pub mod info;

pub use csv_table::{
    DEFAULT_NA_VALUES, EXTRA_NA_VALUES, ExtractOptions, Extraction, infer_column, read_delimited,
};
pub use error::{IngestError, Result};
pub use info::{ColumnInfo, DataInfo, Preview, data_info, preview};
