//! Per-column type coercion.
//!
//! Datetime coercion is cell-granular: a value that does not parse becomes
//! null and the rest of the column converts. Every other target is
//! column-granular: one bad cell aborts the conversion of the whole column,
//! which then keeps its previous values and type. The failure is reported
//! through the sink and never stops the batch.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;
use tidyload_model::{
    EventSink, PipelineEvent, RecordBatch, Result, SemanticType, Stage, Value, ValueKind,
};

use crate::datetime::value_to_timestamp;
use crate::numeric::{parse_f64, parse_i64};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    Integer,
    Float,
    Boolean,
    String,
    Datetime,
    Category,
}

impl TargetType {
    /// Resolve a configured type name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "int" | "int64" | "integer" => Some(Self::Integer),
            "float" | "float64" | "double" => Some(Self::Float),
            "bool" | "boolean" => Some(Self::Boolean),
            "str" | "string" | "object" => Some(Self::String),
            "datetime" | "datetime64" | "timestamp" => Some(Self::Datetime),
            "category" => Some(Self::Category),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Datetime => "datetime",
            Self::Category => "category",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a column could not be converted.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoercionError {
    #[error("unknown target type '{0}'")]
    UnknownType(String),
    #[error("row {row}: cannot convert null to {target}")]
    NullValue { row: usize, target: TargetType },
    #[error("row {row}: cannot convert '{value}' to {target}")]
    InvalidValue {
        row: usize,
        value: String,
        target: TargetType,
    },
    #[error("row {row}: cannot convert {kind} value to {target}")]
    Unsupported {
        row: usize,
        kind: ValueKind,
        target: TargetType,
    },
}

/// Convert each mapped column that exists in the batch.
pub fn coerce_types(
    mut batch: RecordBatch,
    mapping: &BTreeMap<String, String>,
    sink: &mut dyn EventSink,
) -> Result<RecordBatch> {
    for (column, type_name) in mapping {
        let Some(values) = batch.column_values(column) else {
            continue;
        };
        let converted = TargetType::parse(type_name)
            .ok_or_else(|| CoercionError::UnknownType(type_name.clone()))
            .and_then(|target| coerce_column(&values, target));
        match converted {
            Ok(converted) => {
                let nulled = values
                    .iter()
                    .zip(&converted.values)
                    .filter(|(before, after)| !before.is_null() && after.is_null())
                    .count();
                batch.replace_column_values(column, converted.values)?;
                batch.set_semantic_type(column, converted.semantic_type);
                if nulled > 0 {
                    sink.emit(PipelineEvent::CellsNulled {
                        stage: Stage::TypeCoercion,
                        column: column.clone(),
                        count: nulled,
                    });
                }
                sink.emit(PipelineEvent::ColumnCoerced {
                    column: column.clone(),
                    target: type_name.clone(),
                });
            }
            Err(err) => sink.emit(PipelineEvent::CoercionFailed {
                column: column.clone(),
                target: type_name.clone(),
                reason: err.to_string(),
            }),
        }
    }
    Ok(batch)
}

/// Values and declared type of a converted column.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedColumn {
    pub values: Vec<Value>,
    pub semantic_type: SemanticType,
}

pub fn coerce_column(
    values: &[Value],
    target: TargetType,
) -> std::result::Result<CoercedColumn, CoercionError> {
    let (values, semantic_type) = match target {
        TargetType::Datetime => (
            values
                .iter()
                .map(|v| value_to_timestamp(v).map_or(Value::Null, Value::Timestamp))
                .collect(),
            SemanticType::Datetime,
        ),
        TargetType::Category => {
            let values: Vec<Value> = values
                .iter()
                .map(|v| {
                    if v.is_null() {
                        Value::Null
                    } else {
                        Value::Category(v.to_string())
                    }
                })
                .collect();
            let categories: BTreeSet<String> = values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            (
                values,
                SemanticType::Categorical {
                    categories: categories.into_iter().collect(),
                },
            )
        }
        TargetType::String => (
            values
                .iter()
                .map(|v| {
                    if v.is_null() {
                        Value::Null
                    } else {
                        Value::Str(v.to_string())
                    }
                })
                .collect(),
            SemanticType::String,
        ),
        TargetType::Integer => (each(values, to_integer)?, SemanticType::Integer),
        TargetType::Float => (each(values, to_float)?, SemanticType::Float),
        TargetType::Boolean => (each(values, to_boolean)?, SemanticType::Boolean),
    };
    Ok(CoercedColumn {
        values,
        semantic_type,
    })
}

fn each(
    values: &[Value],
    convert: impl Fn(usize, &Value) -> std::result::Result<Value, CoercionError>,
) -> std::result::Result<Vec<Value>, CoercionError> {
    values
        .iter()
        .enumerate()
        .map(|(row, v)| convert(row, v))
        .collect()
}

fn invalid(row: usize, value: &str, target: TargetType) -> CoercionError {
    CoercionError::InvalidValue {
        row,
        value: value.to_string(),
        target,
    }
}

fn to_integer(row: usize, value: &Value) -> std::result::Result<Value, CoercionError> {
    let target = TargetType::Integer;
    if value.is_null() {
        return Err(CoercionError::NullValue { row, target });
    }
    match value {
        Value::Int(v) => Ok(Value::Int(*v)),
        Value::Float(v) if v.is_finite() => Ok(Value::Int(v.trunc() as i64)),
        Value::Float(v) => Err(invalid(row, &v.to_string(), target)),
        Value::Bool(v) => Ok(Value::Int(i64::from(*v))),
        Value::Str(text) | Value::Category(text) => parse_i64(text)
            .map(Value::Int)
            .ok_or_else(|| invalid(row, text, target)),
        other => Err(CoercionError::Unsupported {
            row,
            kind: other.kind(),
            target,
        }),
    }
}

fn to_float(row: usize, value: &Value) -> std::result::Result<Value, CoercionError> {
    let target = TargetType::Float;
    if value.is_null() {
        return Ok(Value::Null);
    }
    match value {
        Value::Int(v) => Ok(Value::Float(*v as f64)),
        Value::Float(v) => Ok(Value::Float(*v)),
        Value::Bool(v) => Ok(Value::Float(if *v { 1.0 } else { 0.0 })),
        Value::Str(text) | Value::Category(text) => parse_f64(text)
            .map(|v| if v.is_nan() { Value::Null } else { Value::Float(v) })
            .ok_or_else(|| invalid(row, text, target)),
        other => Err(CoercionError::Unsupported {
            row,
            kind: other.kind(),
            target,
        }),
    }
}

fn to_boolean(row: usize, value: &Value) -> std::result::Result<Value, CoercionError> {
    let target = TargetType::Boolean;
    if value.is_null() {
        return Ok(Value::Null);
    }
    match value {
        Value::Bool(v) => Ok(Value::Bool(*v)),
        Value::Int(v) => Ok(Value::Bool(*v != 0)),
        Value::Float(v) => Ok(Value::Bool(*v != 0.0)),
        Value::Str(text) | Value::Category(text) => {
            match text.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "1" => Ok(Value::Bool(true)),
                "false" | "f" | "no" | "n" | "0" => Ok(Value::Bool(false)),
                _ => Err(invalid(row, text, target)),
            }
        }
        other => Err(CoercionError::Unsupported {
            row,
            kind: other.kind(),
            target,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tidyload_model::RecordingSink;

    fn mapping(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(c, t)| ((*c).to_string(), (*t).to_string()))
            .collect()
    }

    #[test]
    fn type_names() {
        assert_eq!(TargetType::parse("int64"), Some(TargetType::Integer));
        assert_eq!(TargetType::parse("Float64"), Some(TargetType::Float));
        assert_eq!(TargetType::parse("object"), Some(TargetType::String));
        assert_eq!(TargetType::parse("datetime64"), Some(TargetType::Datetime));
        assert_eq!(TargetType::parse("decimal"), None);
    }

    #[test]
    fn datetime_coercion_is_cell_granular() {
        let values = vec![Value::str("2024-02-01"), Value::str("garbage"), Value::Null];
        let out = coerce_column(&values, TargetType::Datetime).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            out.values,
            vec![Value::Timestamp(expected), Value::Null, Value::Null]
        );
        assert_eq!(out.semantic_type, SemanticType::Datetime);
    }

    #[test]
    fn integer_coercion_is_column_granular() {
        let values = vec![Value::str("1"), Value::str("2.5"), Value::str("3")];
        let err = coerce_column(&values, TargetType::Integer).unwrap_err();
        assert_eq!(
            err,
            CoercionError::InvalidValue {
                row: 1,
                value: "2.5".to_string(),
                target: TargetType::Integer
            }
        );

        let err = coerce_column(&[Value::Int(1), Value::Null], TargetType::Integer).unwrap_err();
        assert_eq!(
            err,
            CoercionError::NullValue {
                row: 1,
                target: TargetType::Integer
            }
        );
    }

    #[test]
    fn fractional_floats_truncate_to_integers() {
        let out = coerce_column(&[Value::Float(2.9), Value::Float(-2.9)], TargetType::Integer)
            .unwrap();
        assert_eq!(out.values, vec![Value::Int(2), Value::Int(-2)]);
    }

    #[test]
    fn boolean_tokens_are_strict() {
        let values = vec![Value::str(" Yes "), Value::str("0"), Value::Int(2), Value::Null];
        let out = coerce_column(&values, TargetType::Boolean).unwrap();
        assert_eq!(
            out.values,
            vec![Value::Bool(true), Value::Bool(false), Value::Bool(true), Value::Null]
        );

        let err = coerce_column(&[Value::str("y"), Value::str("no thanks")], TargetType::Boolean)
            .unwrap_err();
        assert_eq!(
            err,
            CoercionError::InvalidValue {
                row: 1,
                value: "no thanks".to_string(),
                target: TargetType::Boolean
            }
        );
    }

    #[test]
    fn category_collects_labels() {
        let values = vec![Value::str("Gold"), Value::Null, Value::str("Basic"), Value::str("Gold")];
        let out = coerce_column(&values, TargetType::Category).unwrap();
        assert_eq!(
            out.semantic_type,
            SemanticType::Categorical {
                categories: vec!["Basic".to_string(), "Gold".to_string()]
            }
        );
        assert_eq!(out.values[1], Value::Null);
    }

    #[test]
    fn failed_column_keeps_previous_values() {
        let batch = RecordBatch::from_rows(
            &["customer_id", "total_spent", "signup"],
            vec![
                vec![Value::str("7"), Value::str("12.5"), Value::str("2024-01-01")],
                vec![Value::str("x"), Value::str("3"), Value::str("later")],
            ],
        )
        .unwrap();
        let map = mapping(&[
            ("customer_id", "int64"),
            ("total_spent", "float64"),
            ("signup", "datetime"),
            ("absent", "int64"),
        ]);
        let mut sink = RecordingSink::new();
        let out = coerce_types(batch, &map, &mut sink).unwrap();

        assert_eq!(out.value(0, "customer_id"), Some(&Value::str("7")));
        assert_eq!(out.semantic_type("customer_id"), Some(&SemanticType::String));
        assert_eq!(out.value(1, "total_spent"), Some(&Value::Float(3.0)));
        assert_eq!(out.value(1, "signup"), Some(&Value::Null));
        assert!(sink.events().iter().any(|e| matches!(
            e,
            PipelineEvent::CoercionFailed { column, .. } if column == "customer_id"
        )));
        assert!(sink.events().contains(&PipelineEvent::CellsNulled {
            stage: Stage::TypeCoercion,
            column: "signup".to_string(),
            count: 1
        }));
    }

    #[test]
    fn unknown_type_fails_column_only() {
        let batch = RecordBatch::from_rows(&["a"], vec![vec![Value::Int(1)]]).unwrap();
        let mut sink = RecordingSink::new();
        let out = coerce_types(batch, &mapping(&[("a", "decimal")]), &mut sink).unwrap();
        assert_eq!(out.value(0, "a"), Some(&Value::Int(1)));
        assert_eq!(
            sink.events(),
            &[PipelineEvent::CoercionFailed {
                column: "a".to_string(),
                target: "decimal".to_string(),
                reason: "unknown target type 'decimal'".to_string()
            }]
        );
    }
}
