//! Calculated columns derived from customer fields.
//!
//! Each calculation runs only when its source columns exist. The first failing
//! calculation stops the rest; the batch is returned as far as it got and the
//! failure is reported through the sink rather than returned. Day counts are
//! integers, so a null date cell is a failure just like an unparseable one.

use chrono::NaiveDateTime;
use thiserror::Error;
use tidyload_model::{
    BatchError, ColumnMeta, EventSink, NullRendering, PipelineEvent, RecordBatch, Result,
    SemanticType, Value,
};

use crate::datetime::value_to_timestamp;
use crate::numeric::value_to_f64;

pub const LTV_LABELS: [&str; 4] = ["Low", "Medium", "High", "Premium"];

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Error)]
pub enum CalculationError {
    #[error("{column} row {row}: cannot parse '{value}' as a date")]
    UnparseableDate {
        column: String,
        row: usize,
        value: String,
    },
    #[error("{column} row {row}: date is missing, cannot count days")]
    NullDate { column: String, row: usize },
    #[error(transparent)]
    Batch(#[from] BatchError),
}

/// Add `days_since_registration`, `days_since_last_purchase`, `ltv_tier`,
/// `full_name` and `processed_at`.
///
/// `now` is evaluated once by the caller, so every row shares one
/// `processed_at` value.
pub fn add_calculated_fields(
    mut batch: RecordBatch,
    now: NaiveDateTime,
    nulls: NullRendering,
    sink: &mut dyn EventSink,
) -> Result<RecordBatch> {
    let mut added = Vec::new();
    match try_calculate(&mut batch, now, nulls, &mut added) {
        Ok(()) => sink.emit(PipelineEvent::FieldsCalculated { columns: added }),
        Err(CalculationError::Batch(err)) => return Err(err),
        Err(err) => {
            let field = match &err {
                CalculationError::UnparseableDate { column, .. }
                | CalculationError::NullDate { column, .. } => column.clone(),
                CalculationError::Batch(_) => String::new(),
            };
            if !added.is_empty() {
                sink.emit(PipelineEvent::FieldsCalculated { columns: added });
            }
            sink.emit(PipelineEvent::CalculationFailed {
                field,
                reason: err.to_string(),
            });
        }
    }
    Ok(batch)
}

fn try_calculate(
    batch: &mut RecordBatch,
    now: NaiveDateTime,
    nulls: NullRendering,
    added: &mut Vec<String>,
) -> std::result::Result<(), CalculationError> {
    for (source, target) in [
        ("registration_date", "days_since_registration"),
        ("last_purchase_date", "days_since_last_purchase"),
    ] {
        if batch.has_column(source) {
            let dates = timestamps(batch, source)?;
            let days = dates
                .iter()
                .map(|ts| Value::Int(days_between(*ts, now)))
                .collect();
            let dates = dates.into_iter().map(Value::Timestamp).collect();
            batch.replace_column_values(source, dates)?;
            batch.set_semantic_type(source, SemanticType::Datetime);
            batch.upsert_column(ColumnMeta::new(target, SemanticType::Integer), days)?;
            added.push(target.to_string());
        }
    }

    if batch.has_column("total_spent") {
        let spent: Vec<Value> = batch
            .column_values("total_spent")
            .unwrap_or_default()
            .iter()
            .map(|v| value_to_f64(v).map_or(Value::Null, Value::Float))
            .collect();
        let tiers = spent
            .iter()
            .map(|v| {
                v.as_f64()
                    .and_then(ltv_tier)
                    .map_or(Value::Null, |label| Value::Category(label.to_string()))
            })
            .collect();
        batch.replace_column_values("total_spent", spent)?;
        batch.set_semantic_type("total_spent", SemanticType::Float);
        batch.upsert_column(
            ColumnMeta::new(
                "ltv_tier",
                SemanticType::Categorical {
                    categories: LTV_LABELS.iter().map(|l| (*l).to_string()).collect(),
                },
            ),
            tiers,
        )?;
        added.push("ltv_tier".to_string());
    }

    if let (Some(first), Some(last)) = (
        batch.column_values("first_name"),
        batch.column_values("last_name"),
    ) {
        let names = first
            .iter()
            .zip(&last)
            .map(|(f, l)| full_name(f, l, nulls))
            .collect();
        batch.upsert_column(ColumnMeta::new("full_name", SemanticType::String), names)?;
        added.push("full_name".to_string());
    }

    let stamps = vec![Value::Timestamp(now); batch.height()];
    batch.upsert_column(
        ColumnMeta::new("processed_at", SemanticType::Datetime),
        stamps,
    )?;
    added.push("processed_at".to_string());
    Ok(())
}

/// Parse a date column; the first null or unparseable cell fails.
fn timestamps(
    batch: &RecordBatch,
    column: &str,
) -> std::result::Result<Vec<NaiveDateTime>, CalculationError> {
    let values = batch.column_values(column).unwrap_or_default();
    values
        .iter()
        .enumerate()
        .map(|(row, value)| {
            if value.is_null() {
                return Err(CalculationError::NullDate {
                    column: column.to_string(),
                    row,
                });
            }
            value_to_timestamp(value)
                .ok_or_else(|| CalculationError::UnparseableDate {
                    column: column.to_string(),
                    row,
                    value: value.to_string(),
                })
        })
        .collect()
}

/// Whole days from `from` to `now`, floored.
pub fn days_between(from: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (now - from).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Bucket a spend amount: `[0, 500]`, `(500, 1000]`, `(1000, 2000]`, `(2000, inf)`.
pub fn ltv_tier(total_spent: f64) -> Option<&'static str> {
    if total_spent.is_nan() || total_spent < 0.0 {
        None
    } else if total_spent <= 500.0 {
        Some(LTV_LABELS[0])
    } else if total_spent <= 1000.0 {
        Some(LTV_LABELS[1])
    } else if total_spent <= 2000.0 {
        Some(LTV_LABELS[2])
    } else {
        Some(LTV_LABELS[3])
    }
}

fn full_name(first: &Value, last: &Value, nulls: NullRendering) -> Value {
    match nulls {
        NullRendering::Nan => {
            let joined = format!("{first} {last}");
            if joined == "nan nan" {
                Value::Null
            } else {
                Value::Str(joined)
            }
        }
        NullRendering::Keep => {
            let parts: Vec<String> = [first, last]
                .into_iter()
                .filter(|v| !v.is_null())
                .map(ToString::to_string)
                .collect();
            if parts.is_empty() {
                Value::Null
            } else {
                Value::Str(parts.join(" "))
            }
        }
    }
}
