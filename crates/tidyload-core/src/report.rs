use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tidyload_model::{EventSink, PipelineEvent, RecordBatch, Stage};

/// Row counts and timing for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub rows_in: usize,
    pub rows_out: usize,
    pub duration_ms: u128,
}

/// Statistics for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub stages: Vec<StageReport>,
    pub initial_rows: usize,
    pub final_rows: usize,
    pub valid_rows: usize,
    pub rows_removed: usize,
    /// Percentage of final rows that passed every business rule.
    pub data_quality_score: f64,
    pub duplicates_removed: usize,
    /// Violations per business rule id, for rules that were evaluated.
    pub rule_violations: BTreeMap<String, usize>,
    /// Cells set to null per column by validators and coercion.
    pub nulled_cells: BTreeMap<String, usize>,
    /// Columns whose type conversion failed, with the reason.
    pub coercion_failures: BTreeMap<String, String>,
    pub calculation_failure: Option<String>,
}

impl RunReport {
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }
}

/// Valid rows as a percentage of final rows; zero for an empty batch.
pub fn quality_score(valid_rows: usize, final_rows: usize) -> f64 {
    if final_rows == 0 {
        0.0
    } else {
        valid_rows as f64 / final_rows as f64 * 100.0
    }
}

/// Forwards events to the caller's sink while accumulating a [`RunReport`].
pub(crate) struct ReportCollector<'a> {
    inner: &'a mut dyn EventSink,
    report: RunReport,
}

impl<'a> ReportCollector<'a> {
    pub(crate) fn new(inner: &'a mut dyn EventSink) -> Self {
        Self {
            inner,
            report: RunReport::default(),
        }
    }

    pub(crate) fn record_duration(&mut self, stage: Stage, elapsed: Duration) {
        if let Some(report) = self.report.stages.iter_mut().find(|r| r.stage == stage) {
            report.duration_ms = elapsed.as_millis();
        }
    }

    pub(crate) fn finish(self, initial_rows: usize, batch: &RecordBatch) -> RunReport {
        let mut report = self.report;
        report.initial_rows = initial_rows;
        report.final_rows = batch.height();
        report.rows_removed = initial_rows.saturating_sub(batch.height());
        report.data_quality_score = quality_score(report.valid_rows, report.final_rows);
        report
    }

    fn observe(&mut self, event: &PipelineEvent) {
        let report = &mut self.report;
        match event {
            PipelineEvent::StageFinished {
                stage,
                rows_in,
                rows_out,
            } => report.stages.push(StageReport {
                stage: *stage,
                rows_in: *rows_in,
                rows_out: *rows_out,
                duration_ms: 0,
            }),
            PipelineEvent::DuplicatesRemoved { removed } => report.duplicates_removed += removed,
            PipelineEvent::CellsNulled { column, count, .. } if *count > 0 => {
                *report.nulled_cells.entry(column.clone()).or_default() += count;
            }
            PipelineEvent::CoercionFailed { column, reason, .. } => {
                report
                    .coercion_failures
                    .insert(column.clone(), reason.clone());
            }
            PipelineEvent::CalculationFailed { reason, .. } => {
                report.calculation_failure = Some(reason.clone());
            }
            PipelineEvent::RuleEvaluated { rule, violations } => {
                report.rule_violations.insert(rule.clone(), *violations);
            }
            PipelineEvent::ValidationCompleted { valid, .. } => report.valid_rows = *valid,
            _ => {}
        }
    }
}

impl EventSink for ReportCollector<'_> {
    fn emit(&mut self, event: PipelineEvent) {
        self.observe(&event);
        self.inner.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_score_handles_empty_batches() {
        assert_eq!(quality_score(0, 0), 0.0);
        assert_eq!(quality_score(3, 4), 75.0);
    }
}
