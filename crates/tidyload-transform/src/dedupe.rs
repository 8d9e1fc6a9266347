use std::collections::{HashMap, HashSet};

use tidyload_model::{EventSink, KeepPolicy, PipelineEvent, RecordBatch, Result, ValueKey};

/// Remove rows whose key columns match an earlier (or later) row.
///
/// An empty key list compares whole rows. Key columns missing from the batch
/// are ignored; if none of the requested keys exist the batch is returned
/// unchanged. Survivors keep their original order.
pub fn dedupe(
    mut batch: RecordBatch,
    key_columns: &[String],
    keep: KeepPolicy,
    sink: &mut dyn EventSink,
) -> Result<RecordBatch> {
    let indices: Vec<usize> = if key_columns.is_empty() {
        (0..batch.width()).collect()
    } else {
        key_columns
            .iter()
            .filter_map(|name| batch.column_index(name))
            .collect()
    };
    if indices.is_empty() {
        sink.emit(PipelineEvent::DuplicatesRemoved { removed: 0 });
        return Ok(batch);
    }

    let keys: Vec<Vec<ValueKey>> = batch
        .rows()
        .iter()
        .map(|row| indices.iter().map(|&idx| row[idx].key()).collect())
        .collect();
    let mask = keep_mask(&keys, keep);

    let before = batch.height();
    batch.retain_rows(&mask)?;
    sink.emit(PipelineEvent::DuplicatesRemoved {
        removed: before - batch.height(),
    });
    Ok(batch)
}

fn keep_mask(keys: &[Vec<ValueKey>], keep: KeepPolicy) -> Vec<bool> {
    match keep {
        KeepPolicy::First => {
            let mut seen = HashSet::new();
            keys.iter().map(|key| seen.insert(key)).collect()
        }
        KeepPolicy::Last => {
            let mut seen = HashSet::new();
            let mut mask: Vec<bool> = keys.iter().rev().map(|key| seen.insert(key)).collect();
            mask.reverse();
            mask
        }
        KeepPolicy::None => {
            let mut counts: HashMap<&Vec<ValueKey>, usize> = HashMap::new();
            for key in keys {
                *counts.entry(key).or_default() += 1;
            }
            keys.iter().map(|key| counts[key] == 1).collect()
        }
    }
}
