//! Conversion of record batches into polars frames for writing.

use polars::prelude::{Column, DataFrame, DataType, PolarsResult, TimeUnit};
use tidyload_model::{NullRendering, RecordBatch, SemanticType, Value};

/// Build a `DataFrame` with one typed column per batch column.
///
/// Datetimes become millisecond `Datetime` columns. A column holding values
/// its declared type does not accept is written as text.
pub fn batch_to_frame(batch: &RecordBatch) -> PolarsResult<DataFrame> {
    let mut columns = Vec::with_capacity(batch.width());
    for meta in batch.columns() {
        let values = batch.column_values(&meta.name).unwrap_or_default();
        let name = meta.name.as_str().into();
        let consistent = values.iter().all(|v| meta.semantic_type.accepts(v));
        let column = match &meta.semantic_type {
            SemanticType::Integer if consistent => Column::new(
                name,
                values
                    .iter()
                    .map(|v| match v {
                        Value::Int(i) => Some(*i),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
            ),
            SemanticType::Float if consistent => Column::new(
                name,
                values.iter().map(Value::as_f64).collect::<Vec<_>>(),
            ),
            SemanticType::Boolean if consistent => Column::new(
                name,
                values
                    .iter()
                    .map(|v| match v {
                        Value::Bool(b) => Some(*b),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
            ),
            SemanticType::Datetime if consistent => Column::new(
                name,
                values
                    .iter()
                    .map(|v| v.as_timestamp().map(|ts| ts.and_utc().timestamp_millis()))
                    .collect::<Vec<_>>(),
            )
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
            _ => Column::new(
                name,
                values
                    .iter()
                    .map(|v| v.to_text(NullRendering::Keep))
                    .collect::<Vec<_>>(),
            ),
        };
        columns.push(column);
    }
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tidyload_model::ColumnMeta;

    #[test]
    fn typed_columns() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let batch = RecordBatch::new(
            vec![
                ColumnMeta::new("id", SemanticType::Integer),
                ColumnMeta::new("spent", SemanticType::Float),
                ColumnMeta::new("ok", SemanticType::Boolean),
                ColumnMeta::new("at", SemanticType::Datetime),
                ColumnMeta::new("name", SemanticType::String),
            ],
            vec![
                vec![
                    Value::Int(1),
                    Value::Int(2),
                    Value::Bool(true),
                    Value::Timestamp(ts),
                    Value::str("ada"),
                ],
                vec![Value::Null, Value::Null, Value::Null, Value::Null, Value::Null],
            ],
        )
        .unwrap();
        let df = batch_to_frame(&batch).unwrap();
        assert_eq!(df.shape(), (2, 5));
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("spent").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("ok").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(
            df.column("at").unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert_eq!(df.column("name").unwrap().null_count(), 1);
    }

    #[test]
    fn inconsistent_column_is_written_as_text() {
        let batch = RecordBatch::new(
            vec![ColumnMeta::new("id", SemanticType::Integer)],
            vec![vec![Value::str("x")]],
        )
        .unwrap();
        let df = batch_to_frame(&batch).unwrap();
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::String);
    }
}
