//! Event sinks that forward pipeline events to `tracing`.

use tidyload_model::{EventSink, PipelineEvent};
use tracing::{debug, error, info, warn};

/// Logs every event: progress at info, nulled cells and skipped strategies at
/// warn, column and calculation failures at error.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::StageStarted { stage, rows } => {
                debug!(stage = %stage, rows, "stage started");
            }
            PipelineEvent::StageFinished {
                stage,
                rows_in,
                rows_out,
            } => {
                info!(stage = %stage, rows_in, rows_out, "stage complete");
            }
            PipelineEvent::MissingValuesResolved {
                column,
                strategy,
                nulls,
                rows_dropped,
            } => {
                info!(
                    column = %column,
                    strategy = %strategy,
                    nulls,
                    rows_dropped,
                    "handled missing values"
                );
            }
            PipelineEvent::StrategySkipped {
                column,
                strategy,
                reason,
            } => {
                warn!(column = %column, strategy = %strategy, reason = %reason, "missing value strategy skipped");
            }
            PipelineEvent::DuplicatesRemoved { removed } => {
                info!(removed, "removed duplicate rows");
            }
            PipelineEvent::TextNormalized { column, operations } => {
                debug!(column = %column, operations = ?operations, "standardized text");
            }
            PipelineEvent::CellsNulled {
                stage,
                column,
                count,
            } => {
                if count > 0 {
                    warn!(stage = %stage, column = %column, count, "invalid values set to null");
                } else {
                    debug!(stage = %stage, column = %column, "all values valid");
                }
            }
            PipelineEvent::ColumnCoerced { column, target } => {
                info!(column = %column, target = %target, "converted column");
            }
            PipelineEvent::CoercionFailed {
                column,
                target,
                reason,
            } => {
                error!(column = %column, target = %target, reason = %reason, "column conversion failed");
            }
            PipelineEvent::FieldsCalculated { columns } => {
                info!(columns = ?columns, "added calculated fields");
            }
            PipelineEvent::CalculationFailed { field, reason } => {
                error!(field = %field, reason = %reason, "calculated fields incomplete");
            }
            PipelineEvent::RuleEvaluated { rule, violations } => {
                info!(rule = %rule, violations, "business rule evaluated");
            }
            PipelineEvent::ValidationCompleted { valid, total } => {
                info!(valid, total, "validation complete");
            }
        }
    }
}

/// Forwards each event to two sinks in turn.
pub struct Tee<A, B>(pub A, pub B);

impl<A: EventSink, B: EventSink> EventSink for Tee<A, B> {
    fn emit(&mut self, event: PipelineEvent) {
        self.0.emit(event.clone());
        self.1.emit(event);
    }
}
