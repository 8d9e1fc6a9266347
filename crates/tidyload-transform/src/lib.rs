//! Transformation stages for tidyload record batches.
//!
//! Each stage takes a [`RecordBatch`](tidyload_model::RecordBatch) by value,
//! returns the transformed batch and reports what it did through an
//! [`EventSink`](tidyload_model::EventSink):
//!
//! - **missing**: per-column null handling (drop, statistics, fills)
//! - **dedupe**: key-based duplicate elimination
//! - **text**: string normalization operations
//! - **fields**: email and phone validators
//! - **coerce**: per-column type coercion
//! - **derived**: calculated customer fields
//! - **datetime** / **numeric**: lenient parsing helpers

pub mod coerce;
pub mod datetime;
pub mod dedupe;
pub mod derived;
pub mod fields;
pub mod missing;
pub mod numeric;
pub mod text;

pub use coerce::{CoercedColumn, CoercionError, TargetType, coerce_column, coerce_types};
pub use datetime::{parse_date, parse_datetime, value_to_timestamp};
pub use dedupe::dedupe;
pub use derived::{CalculationError, LTV_LABELS, add_calculated_fields, days_between, ltv_tier};
pub use fields::{format_phone, is_valid_email, validate_email, validate_phone};
pub use missing::{mode_of, resolve_missing};
pub use numeric::{parse_f64, parse_i64, value_to_f64};
pub use text::{apply_operation, apply_operations, normalize_text, title_case};
