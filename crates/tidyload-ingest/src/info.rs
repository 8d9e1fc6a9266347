//! Summaries of an extracted batch for inspection.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tidyload_model::{RecordBatch, SemanticType, Value, ValueKey};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub semantic_type: SemanticType,
    pub null_count: usize,
}

/// Shape, types and quality counters of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataInfo {
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: Vec<ColumnInfo>,
    pub null_counts: BTreeMap<String, usize>,
    /// Rows identical to an earlier row across every column.
    pub duplicate_rows: usize,
}

pub fn data_info(batch: &RecordBatch) -> DataInfo {
    let columns = batch
        .columns()
        .iter()
        .map(|meta| ColumnInfo {
            name: meta.name.clone(),
            semantic_type: meta.semantic_type.clone(),
            null_count: batch.null_count(&meta.name),
        })
        .collect();
    let mut seen: HashSet<Vec<ValueKey>> = HashSet::new();
    let duplicate_rows = batch
        .rows()
        .iter()
        .filter(|row| !seen.insert(row.iter().map(Value::key).collect()))
        .count();
    DataInfo {
        total_rows: batch.height(),
        total_columns: batch.width(),
        columns,
        null_counts: batch.null_counts(),
        duplicate_rows,
    }
}

/// First and last rows of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub head: Vec<Vec<Value>>,
    pub tail: Vec<Vec<Value>>,
}

pub fn preview(batch: &RecordBatch, num_rows: usize) -> Preview {
    let rows = batch.rows();
    let head_len = num_rows.min(rows.len());
    let tail_start = rows.len().saturating_sub(num_rows);
    Preview {
        columns: batch.column_names(),
        head: rows[..head_len].to_vec(),
        tail: rows[tail_start..].to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> RecordBatch {
        RecordBatch::from_rows(
            &["id", "city"],
            (0..6)
                .map(|i| vec![Value::Int(i % 4), Value::str(if i % 4 == 0 { "Oslo" } else { "Rome" })])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn counts_full_row_duplicates() {
        let info = data_info(&batch());
        assert_eq!(info.total_rows, 6);
        assert_eq!(info.total_columns, 2);
        assert_eq!(info.duplicate_rows, 2);
        assert_eq!(info.columns[0].semantic_type, SemanticType::Integer);
    }

    #[test]
    fn preview_takes_head_and_tail() {
        let preview = preview(&batch(), 2);
        assert_eq!(preview.head.len(), 2);
        assert_eq!(preview.tail[1][0], Value::Int(1));

        let short = super::preview(&batch(), 10);
        assert_eq!(short.head.len(), 6);
        assert_eq!(short.tail.len(), 6);
    }
}
