//! Dynamically typed cell values.
//!
//! Every cell of a [`RecordBatch`](crate::RecordBatch) holds a [`Value`]. The
//! variants mirror the semantic types a column can carry after coercion, and
//! the text form produced by [`Value::to_text`] is the one used by every
//! string-coercing transformation (text normalization, phone cleanup, name
//! concatenation).

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Layout used when a timestamp is rendered as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Text produced for a null cell under [`NullRendering::Nan`].
pub const NULL_TEXT: &str = "nan";

/// How a null cell is rendered when an operation coerces it to text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullRendering {
    /// Null becomes the literal string `"nan"` (legacy behaviour).
    #[default]
    Nan,
    /// Null stays null; string operations skip the cell.
    Keep,
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Timestamp(NaiveDateTime),
    Category(String),
}

/// Kind tag of a [`Value`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Int,
    Float,
    Bool,
    Str,
    Timestamp,
    Category,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Str => "str",
            ValueKind::Timestamp => "timestamp",
            ValueKind::Category => "category",
        };
        f.write_str(name)
    }
}

/// Hashable identity of a value, used for duplicate detection and mode counting.
///
/// Floats compare by bit pattern after normalizing `-0.0` to `0.0`; all
/// null spellings (including NaN) collapse to [`ValueKey::Null`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey {
    Null,
    Int(i64),
    Float(u64),
    Bool(bool),
    Str(String),
    Timestamp(NaiveDateTime),
    Category(String),
}

impl Value {
    /// Convenience constructor for string cells.
    pub fn str(value: impl Into<String>) -> Self {
        Value::Str(value.into())
    }

    /// True for [`Value::Null`] and for a NaN float.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Float(v) if v.is_nan() => ValueKind::Null,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Str(_) => ValueKind::Str,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Category(_) => ValueKind::Category,
        }
    }

    /// Numeric view of integer and float cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Borrow the text of string and category cells.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Category(s) => Some(s),
            _ => None,
        }
    }

    /// Render the cell as text, honouring the null rendering policy.
    ///
    /// Returns `None` only for a null cell under [`NullRendering::Keep`].
    pub fn to_text(&self, nulls: NullRendering) -> Option<String> {
        if self.is_null() {
            return match nulls {
                NullRendering::Nan => Some(NULL_TEXT.to_string()),
                NullRendering::Keep => None,
            };
        }
        Some(self.to_string())
    }

    pub fn key(&self) -> ValueKey {
        match self {
            v if v.is_null() => ValueKey::Null,
            Value::Int(v) => ValueKey::Int(*v),
            Value::Float(v) => {
                let normalized = if *v == 0.0 { 0.0 } else { *v };
                ValueKey::Float(normalized.to_bits())
            }
            Value::Bool(v) => ValueKey::Bool(*v),
            Value::Str(s) => ValueKey::Str(s.clone()),
            Value::Timestamp(ts) => ValueKey::Timestamp(*ts),
            Value::Category(s) => ValueKey::Category(s.clone()),
            Value::Null => ValueKey::Null,
        }
    }

    /// Total order across all values: nulls first, then by kind, then by value.
    ///
    /// Integers and floats share one numeric ordering.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a.total_cmp(&b);
        }
        let rank = |value: &Value| match value.kind() {
            ValueKind::Null => 0,
            ValueKind::Int | ValueKind::Float => 1,
            ValueKind::Bool => 2,
            ValueKind::Timestamp => 3,
            ValueKind::Str => 4,
            ValueKind::Category => 5,
        };
        match rank(self).cmp(&rank(other)) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) | (Value::Category(a), Value::Category(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            v if v.is_null() => f.write_str(NULL_TEXT),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => f.write_str(&format_float(*v)),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Str(s) | Value::Category(s) => f.write_str(s),
            Value::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            Value::Null => f.write_str(NULL_TEXT),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Format a float so that integral values keep a fractional part (`3.0`).
fn format_float(v: f64) -> String {
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}
