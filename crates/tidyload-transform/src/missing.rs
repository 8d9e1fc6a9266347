//! Per-column null handling.
//!
//! Columns are visited in batch order and only columns holding at least one
//! null are touched. A `drop` on an early column shrinks the batch that later
//! columns see, so fills computed from column statistics (mean, median, mode)
//! always use the rows still present at that point.

use std::collections::BTreeMap;

use tidyload_model::{
    EventSink, MissingValueStrategy, PipelineEvent, RecordBatch, Result, SemanticType, Value,
};

/// Resolve nulls column by column; unlisted columns default to `drop`.
pub fn resolve_missing(
    mut batch: RecordBatch,
    strategies: &BTreeMap<String, MissingValueStrategy>,
    sink: &mut dyn EventSink,
) -> Result<RecordBatch> {
    for column in batch.column_names() {
        let nulls = batch.null_count(&column);
        if nulls == 0 {
            continue;
        }
        let strategy = strategies
            .get(&column)
            .cloned()
            .unwrap_or(MissingValueStrategy::Drop);
        let label = strategy.label();

        let rows_before = batch.height();
        let outcome = match strategy {
            MissingValueStrategy::Drop => {
                drop_null_rows(&mut batch, &column)?;
                Ok(())
            }
            MissingValueStrategy::Mean => numeric_fill(&mut batch, &column, &label, mean),
            MissingValueStrategy::Median => numeric_fill(&mut batch, &column, &label, median),
            MissingValueStrategy::Mode => mode_fill(&mut batch, &column),
            MissingValueStrategy::ForwardFill => {
                propagate(&mut batch, &column, false);
                Ok(())
            }
            MissingValueStrategy::BackwardFill => {
                propagate(&mut batch, &column, true);
                Ok(())
            }
            MissingValueStrategy::Fill(literal) => {
                literal_fill(&mut batch, &column, &literal);
                Ok(())
            }
        };

        match outcome {
            Ok(()) => sink.emit(PipelineEvent::MissingValuesResolved {
                column,
                strategy: label,
                nulls,
                rows_dropped: rows_before - batch.height(),
            }),
            Err(reason) => sink.emit(PipelineEvent::StrategySkipped {
                column,
                strategy: label,
                reason,
            }),
        }
    }
    Ok(batch)
}

fn drop_null_rows(batch: &mut RecordBatch, column: &str) -> Result<()> {
    let Some(col) = batch.column_index(column) else {
        return Ok(());
    };
    let keep: Vec<bool> = batch.rows().iter().map(|row| !row[col].is_null()).collect();
    batch.retain_rows(&keep)
}

fn fill_nulls(batch: &mut RecordBatch, column: &str, fill: &Value) {
    batch.map_column(column, |value| {
        if value.is_null() {
            fill.clone()
        } else {
            value.clone()
        }
    });
}

/// Fill with a statistic of the non-null values.
///
/// A non-numeric column has no statistic; its nulls receive the strategy
/// keyword itself as a literal.
fn numeric_fill(
    batch: &mut RecordBatch,
    column: &str,
    keyword: &str,
    stat: fn(&mut [f64]) -> f64,
) -> std::result::Result<(), String> {
    if !batch
        .semantic_type(column)
        .is_some_and(SemanticType::is_numeric)
    {
        literal_fill(batch, column, &Value::str(keyword));
        return Ok(());
    }
    let mut values: Vec<f64> = batch
        .column_values(column)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_f64)
        .collect();
    if values.is_empty() {
        return Err("column has no non-null values".to_string());
    }
    let fill = Value::Float(stat(&mut values));
    fill_nulls(batch, column, &fill);
    batch.set_semantic_type(column, SemanticType::Float);
    Ok(())
}

fn mean(values: &mut [f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Most frequent non-null value; ties go to the smallest value.
pub fn mode_of(values: &[Value]) -> Option<Value> {
    let mut counts: BTreeMap<_, (usize, &Value)> = BTreeMap::new();
    for value in values.iter().filter(|v| !v.is_null()) {
        counts.entry(value.key()).or_insert((0, value)).0 += 1;
    }
    counts
        .into_values()
        .max_by(|(count_a, a), (count_b, b)| count_a.cmp(count_b).then_with(|| b.total_cmp(a)))
        .map(|(_, value)| value.clone())
}

fn mode_fill(batch: &mut RecordBatch, column: &str) -> std::result::Result<(), String> {
    let values = batch.column_values(column).unwrap_or_default();
    let Some(fill) = mode_of(&values) else {
        return Err("column has no non-null values".to_string());
    };
    fill_nulls(batch, column, &fill);
    Ok(())
}

fn propagate(batch: &mut RecordBatch, column: &str, backward: bool) {
    let Some(mut values) = batch.column_values(column) else {
        return;
    };
    let mut carry: Option<Value> = None;
    let mut step = |value: &mut Value| {
        if value.is_null() {
            if let Some(previous) = &carry {
                *value = previous.clone();
            }
        } else {
            carry = Some(value.clone());
        }
    };
    if backward {
        values.iter_mut().rev().for_each(&mut step);
    } else {
        values.iter_mut().for_each(&mut step);
    }
    let _ = batch.replace_column_values(column, values);
}

fn literal_fill(batch: &mut RecordBatch, column: &str, literal: &Value) {
    fill_nulls(batch, column, literal);
    let accepts = batch
        .semantic_type(column)
        .is_some_and(|ty| ty.accepts(literal));
    if !accepts {
        batch.set_semantic_type(column, SemanticType::String);
    }
}
