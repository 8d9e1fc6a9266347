//! Transform pipeline with a fixed stage order.
//!
//! # Stage Order
//!
//! 1. **MissingValues** - resolve nulls per column (drop or fill)
//! 2. **Deduplication** - remove rows with a repeated key
//! 3. **TextNormalization** - normalize configured text columns
//! 4. **EmailValidation** - null malformed email addresses
//! 5. **PhoneValidation** - format phone numbers or null them
//! 6. **TypeCoercion** - convert columns to their target types
//! 7. **DerivedFields** - add calculated columns
//! 8. **BusinessRules** - flag rows through `is_valid`
//!
//! The order is not configurable. Each stage receives the batch produced by
//! the previous one and no stage keeps data between runs.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDateTime;
use tracing::{debug, info, info_span};

use tidyload_model::{EventSink, PipelineEvent, RecordBatch, Stage, TransformConfig};
use tidyload_transform::{
    add_calculated_fields, coerce_types, dedupe, normalize_text, resolve_missing, validate_email,
    validate_phone,
};
use tidyload_validate::validate_business_rules;

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::report::{ReportCollector, RunReport};

/// Transformed batch plus the statistics of the run that produced it.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub batch: RecordBatch,
    pub report: RunReport,
}

pub struct TransformPipeline {
    config: TransformConfig,
    clock: Arc<dyn Clock>,
}

impl TransformPipeline {
    pub fn new(config: TransformConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Run every stage over `batch`, reporting through `sink`.
    ///
    /// Fails only when the input batch is structurally malformed.
    pub fn run(&self, batch: RecordBatch, sink: &mut dyn EventSink) -> Result<PipelineOutput> {
        batch.validate()?;
        let now = self.clock.now();
        let initial_rows = batch.height();
        let started = Instant::now();
        let mut collector = ReportCollector::new(sink);

        let mut batch = batch;
        for stage in Stage::ORDER {
            let stage_started = Instant::now();
            let rows_in = batch.height();
            batch = info_span!("stage", stage = stage.as_str()).in_scope(|| {
                collector.emit(PipelineEvent::StageStarted {
                    stage,
                    rows: rows_in,
                });
                self.apply(stage, batch, now, &mut collector)
            })?;
            collector.emit(PipelineEvent::StageFinished {
                stage,
                rows_in,
                rows_out: batch.height(),
            });
            collector.record_duration(stage, stage_started.elapsed());
            debug!(
                stage = stage.as_str(),
                duration_ms = stage_started.elapsed().as_millis(),
                "stage timing"
            );
        }

        let report = collector.finish(initial_rows, &batch);
        info!(
            initial_rows = report.initial_rows,
            final_rows = report.final_rows,
            valid_rows = report.valid_rows,
            data_quality_score = report.data_quality_score,
            duration_ms = started.elapsed().as_millis(),
            "transformation complete"
        );
        Ok(PipelineOutput { batch, report })
    }

    fn apply(
        &self,
        stage: Stage,
        batch: RecordBatch,
        now: NaiveDateTime,
        sink: &mut dyn EventSink,
    ) -> Result<RecordBatch> {
        let config = &self.config;
        let batch = match stage {
            Stage::MissingValues => {
                resolve_missing(batch, &config.missing_value_strategy(), sink)?
            }
            Stage::Deduplication => dedupe(
                batch,
                &config.dedup_key_columns(),
                config.dedup_keep(),
                sink,
            )?,
            Stage::TextNormalization => normalize_text(
                batch,
                &config.text_columns(),
                &config.text_operations(),
                config.null_rendering(),
                sink,
            )?,
            Stage::EmailValidation => validate_email(batch, config.email_column(), sink)?,
            Stage::PhoneValidation => validate_phone(batch, config.phone_column(), sink)?,
            Stage::TypeCoercion => coerce_types(batch, &config.type_mapping(), sink)?,
            Stage::DerivedFields => {
                add_calculated_fields(batch, now, config.null_rendering(), sink)?
            }
            Stage::BusinessRules => validate_business_rules(batch, now, sink)?,
        };
        Ok(batch)
    }
}

impl Default for TransformPipeline {
    fn default() -> Self {
        Self::new(TransformConfig::default())
    }
}
