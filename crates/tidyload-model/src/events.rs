//! Pipeline events and the observer interface stages report through.
//!
//! Stages never log directly. They emit [`PipelineEvent`]s into an
//! [`EventSink`] handed to them by the caller, whose lifetime is one pipeline
//! run.

use serde::Serialize;

/// One step of the fixed transformation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    MissingValues,
    Deduplication,
    TextNormalization,
    EmailValidation,
    PhoneValidation,
    TypeCoercion,
    DerivedFields,
    BusinessRules,
}

impl Stage {
    /// Stages in execution order.
    pub const ORDER: [Stage; 8] = [
        Stage::MissingValues,
        Stage::Deduplication,
        Stage::TextNormalization,
        Stage::EmailValidation,
        Stage::PhoneValidation,
        Stage::TypeCoercion,
        Stage::DerivedFields,
        Stage::BusinessRules,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::MissingValues => "missing_values",
            Stage::Deduplication => "deduplication",
            Stage::TextNormalization => "text_normalization",
            Stage::EmailValidation => "email_validation",
            Stage::PhoneValidation => "phone_validation",
            Stage::TypeCoercion => "type_coercion",
            Stage::DerivedFields => "derived_fields",
            Stage::BusinessRules => "business_rules",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    StageStarted {
        stage: Stage,
        rows: usize,
    },
    StageFinished {
        stage: Stage,
        rows_in: usize,
        rows_out: usize,
    },
    /// Nulls in one column were dropped or filled.
    MissingValuesResolved {
        column: String,
        strategy: String,
        nulls: usize,
        rows_dropped: usize,
    },
    /// A strategy could not apply to the column and was skipped.
    StrategySkipped {
        column: String,
        strategy: String,
        reason: String,
    },
    DuplicatesRemoved {
        removed: usize,
    },
    TextNormalized {
        column: String,
        operations: Vec<String>,
    },
    /// Cells that failed a format check and were set to null.
    CellsNulled {
        stage: Stage,
        column: String,
        count: usize,
    },
    ColumnCoerced {
        column: String,
        target: String,
    },
    /// A whole column kept its previous values because coercion failed.
    CoercionFailed {
        column: String,
        target: String,
        reason: String,
    },
    FieldsCalculated {
        columns: Vec<String>,
    },
    /// A derived-field calculation failed; later calculations were skipped.
    CalculationFailed {
        field: String,
        reason: String,
    },
    RuleEvaluated {
        rule: String,
        violations: usize,
    },
    ValidationCompleted {
        valid: usize,
        total: usize,
    },
}

/// Receiver of pipeline events.
pub trait EventSink {
    fn emit(&mut self, event: PipelineEvent);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: PipelineEvent) {
        (**self).emit(event);
    }
}

/// Sink that keeps every event in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<PipelineEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[PipelineEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<PipelineEvent> {
        self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: PipelineEvent) {
        self.events.push(event);
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: PipelineEvent) {}
}
