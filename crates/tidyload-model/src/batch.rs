//! In-memory tabular data model.
//!
//! A [`RecordBatch`] is an ordered list of rows sharing one column set. Rows
//! are stored row-major and aligned with the column list, so a cell is
//! addressed by `(row index, column name)`. The column set only grows: columns
//! can be added or replaced by value, never removed. Rows keep their source
//! order unless a stage explicitly drops some of them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{BatchError, Result};
use crate::value::{Value, ValueKind};

/// Declared semantic type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SemanticType {
    Integer,
    Float,
    Boolean,
    Datetime,
    /// Closed-label categorical over the listed labels.
    Categorical { categories: Vec<String> },
    /// Free text, also used for mixed-content columns.
    String,
}

impl SemanticType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, SemanticType::Integer | SemanticType::Float)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SemanticType::Integer => "integer",
            SemanticType::Float => "float",
            SemanticType::Boolean => "boolean",
            SemanticType::Datetime => "datetime",
            SemanticType::Categorical { .. } => "categorical",
            SemanticType::String => "string",
        }
    }

    /// Whether a value can live in a column of this type without changing it.
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match (self, value) {
            (SemanticType::Integer, Value::Int(_)) => true,
            (SemanticType::Float, Value::Int(_) | Value::Float(_)) => true,
            (SemanticType::Boolean, Value::Bool(_)) => true,
            (SemanticType::Datetime, Value::Timestamp(_)) => true,
            (SemanticType::Categorical { categories }, Value::Category(label)) => {
                categories.iter().any(|c| c == label)
            }
            (SemanticType::String, Value::Str(_)) => true,
            _ => false,
        }
    }

    /// Infer the narrowest type that accepts every value.
    ///
    /// All-null columns and columns mixing kinds are typed as [`SemanticType::String`].
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut kinds = BTreeSet::new();
        let mut labels = BTreeSet::new();
        for value in values {
            match value.kind() {
                ValueKind::Null => {}
                ValueKind::Category => {
                    kinds.insert(ValueKind::Category);
                    if let Some(label) = value.as_str() {
                        labels.insert(label.to_string());
                    }
                }
                kind => {
                    kinds.insert(kind);
                }
            }
        }
        let kinds: Vec<ValueKind> = kinds.into_iter().collect();
        match kinds.as_slice() {
            [ValueKind::Int] => SemanticType::Integer,
            [ValueKind::Float] | [ValueKind::Int, ValueKind::Float] => SemanticType::Float,
            [ValueKind::Bool] => SemanticType::Boolean,
            [ValueKind::Timestamp] => SemanticType::Datetime,
            [ValueKind::Category] => SemanticType::Categorical {
                categories: labels.into_iter().collect(),
            },
            _ => SemanticType::String,
        }
    }
}

/// Column name plus its semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub semantic_type: SemanticType,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
        }
    }
}

/// An ordered, rectangular batch of records.
///
/// Deserialization goes through [`RecordBatch::new`], so a decoded batch is
/// always structurally valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBatch")]
pub struct RecordBatch {
    columns: Vec<ColumnMeta>,
    rows: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct RawBatch {
    columns: Vec<ColumnMeta>,
    rows: Vec<Vec<Value>>,
}

impl TryFrom<RawBatch> for RecordBatch {
    type Error = BatchError;

    fn try_from(raw: RawBatch) -> Result<Self> {
        Self::new(raw.columns, raw.rows)
    }
}

impl RecordBatch {
    /// Build a batch, checking column uniqueness and row shape.
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let batch = Self { columns, rows };
        batch.validate()?;
        Ok(batch)
    }

    /// Build a batch from column names, inferring each column's type from its values.
    pub fn from_rows<S: AsRef<str>>(names: &[S], rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut batch = Self {
            columns: names
                .iter()
                .map(|name| ColumnMeta::new(name.as_ref(), SemanticType::String))
                .collect(),
            rows,
        };
        batch.validate()?;
        for idx in 0..batch.columns.len() {
            let inferred = SemanticType::infer(batch.rows.iter().map(|row| &row[idx]));
            batch.columns[idx].semantic_type = inferred;
        }
        Ok(batch)
    }

    /// Check the structural invariants: unique column names, rectangular rows.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(BatchError::DuplicateColumn(column.name.clone()));
            }
        }
        let width = self.columns.len();
        for (idx, row) in self.rows.iter().enumerate() {
            if row.len() != width {
                return Err(BatchError::RaggedRow {
                    row: idx,
                    expected: width,
                    found: row.len(),
                });
            }
        }
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_meta(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn semantic_type(&self, name: &str) -> Option<&SemanticType> {
        self.column_meta(name).map(|c| &c.semantic_type)
    }

    /// Replace a column's declared type. Returns false if the column is absent.
    pub fn set_semantic_type(&mut self, name: &str, semantic_type: SemanticType) -> bool {
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => {
                column.semantic_type = semantic_type;
                true
            }
            None => false,
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&[Value]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Clone out one column's cells in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<Value>> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[col].clone()).collect())
    }

    pub fn null_count(&self, name: &str) -> usize {
        match self.column_index(name) {
            Some(col) => self.rows.iter().filter(|row| row[col].is_null()).count(),
            None => 0,
        }
    }

    pub fn null_counts(&self) -> BTreeMap<String, usize> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), self.null_count(&c.name)))
            .collect()
    }

    /// Overwrite every cell of an existing column.
    pub fn replace_column_values(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        let col = self
            .column_index(name)
            .ok_or_else(|| BatchError::UnknownColumn(name.to_string()))?;
        if values.len() != self.rows.len() {
            return Err(BatchError::ColumnLength {
                column: name.to_string(),
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[col] = value;
        }
        Ok(())
    }

    /// Apply `f` to every cell of a column. Returns false if the column is absent.
    pub fn map_column(&mut self, name: &str, mut f: impl FnMut(&Value) -> Value) -> bool {
        let Some(col) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            row[col] = f(&row[col]);
        }
        true
    }

    /// Add a column at the end, or replace an existing one in place.
    pub fn upsert_column(&mut self, meta: ColumnMeta, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(BatchError::ColumnLength {
                column: meta.name,
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        match self.column_index(&meta.name) {
            Some(col) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[col] = value;
                }
                self.columns[col] = meta;
            }
            None => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
                self.columns.push(meta);
            }
        }
        Ok(())
    }

    /// Keep the rows whose mask entry is true, preserving order.
    pub fn retain_rows(&mut self, keep: &[bool]) -> Result<()> {
        if keep.len() != self.rows.len() {
            return Err(BatchError::MaskLength {
                expected: self.rows.len(),
                found: keep.len(),
            });
        }
        let mut flags = keep.iter();
        self.rows.retain(|_| flags.next().copied().unwrap_or(false));
        Ok(())
    }

    /// Named view of a row, in column order.
    pub fn row_map(&self, idx: usize) -> Option<BTreeMap<&str, &Value>> {
        let row = self.rows.get(idx)?;
        Some(
            self.columns
                .iter()
                .zip(row)
                .map(|(c, v)| (c.name.as_str(), v))
                .collect(),
        )
    }

    pub fn into_parts(self) -> (Vec<ColumnMeta>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }
}
