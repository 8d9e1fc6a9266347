//! Loading of transformed batches into warehouse tables.
//!
//! - **schema**: semantic type to warehouse column type mapping
//! - **prepare**: last-mile cleanup before writing
//! - **frame**: conversion into polars `DataFrame`s
//! - **loader**: the [`WarehouseLoader`] trait and the directory-backed
//!   [`LocalWarehouse`]

pub mod error;
pub mod frame;
pub mod loader;
pub mod prepare;
pub mod schema;

pub use error::{LoadError, Result};
pub use frame::batch_to_frame;
pub use loader::{
    LoadOptions, LoadSummary, LocalWarehouse, TableInfo, WarehouseLoader, WriteDisposition,
};
pub use prepare::prepare_for_load;
pub use schema::{FieldMode, FieldType, SchemaField, WarehouseSchema};
