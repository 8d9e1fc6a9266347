use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use tidyload_model::{
    ColumnMeta, EventSink, PipelineEvent, RecordBatch, Result, SemanticType, Value,
};
use tidyload_transform::{value_to_f64, value_to_timestamp};

pub const IS_VALID_COLUMN: &str = "is_valid";

/// Cross-field rules a customer row must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessRule {
    /// `registration_date` lies after the validation time.
    FutureRegistration,
    /// `last_purchase_date` precedes `registration_date`.
    PurchaseBeforeRegistration,
    /// `total_spent` is negative.
    NegativeTotalSpent,
}

impl BusinessRule {
    pub const ALL: [BusinessRule; 3] = [
        BusinessRule::FutureRegistration,
        BusinessRule::PurchaseBeforeRegistration,
        BusinessRule::NegativeTotalSpent,
    ];

    pub fn id(self) -> &'static str {
        match self {
            BusinessRule::FutureRegistration => "future_registration",
            BusinessRule::PurchaseBeforeRegistration => "purchase_before_registration",
            BusinessRule::NegativeTotalSpent => "negative_total_spent",
        }
    }

    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            BusinessRule::FutureRegistration => &["registration_date"],
            BusinessRule::PurchaseBeforeRegistration => &["registration_date", "last_purchase_date"],
            BusinessRule::NegativeTotalSpent => &["total_spent"],
        }
    }

    fn violated_by(self, batch: &RecordBatch, row: usize, now: NaiveDateTime) -> bool {
        let timestamp = |column: &str| batch.value(row, column).and_then(value_to_timestamp);
        match self {
            BusinessRule::FutureRegistration => {
                timestamp("registration_date").is_some_and(|registered| registered > now)
            }
            BusinessRule::PurchaseBeforeRegistration => {
                match (timestamp("last_purchase_date"), timestamp("registration_date")) {
                    (Some(purchased), Some(registered)) => purchased < registered,
                    _ => false,
                }
            }
            BusinessRule::NegativeTotalSpent => batch
                .value(row, "total_spent")
                .and_then(value_to_f64)
                .is_some_and(|spent| spent < 0.0),
        }
    }
}

impl fmt::Display for BusinessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Rows violating one evaluated rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub rule: BusinessRule,
    pub violating_rows: Vec<usize>,
}

/// Result of evaluating every applicable rule against a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub total_rows: usize,
    /// Outcomes for rules whose columns exist; skipped rules are absent.
    pub outcomes: Vec<RuleOutcome>,
}

impl RuleReport {
    pub fn violation_count(&self, rule: BusinessRule) -> usize {
        self.outcomes
            .iter()
            .find(|outcome| outcome.rule == rule)
            .map_or(0, |outcome| outcome.violating_rows.len())
    }

    pub fn was_evaluated(&self, rule: BusinessRule) -> bool {
        self.outcomes.iter().any(|outcome| outcome.rule == rule)
    }

    /// Rules a given row fails.
    pub fn reasons(&self, row: usize) -> Vec<BusinessRule> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.violating_rows.contains(&row))
            .map(|outcome| outcome.rule)
            .collect()
    }

    /// Validity flag per row; false once any rule fires.
    pub fn validity(&self) -> Vec<bool> {
        let mut valid = vec![true; self.total_rows];
        for outcome in &self.outcomes {
            for &row in &outcome.violating_rows {
                valid[row] = false;
            }
        }
        valid
    }

    pub fn valid_rows(&self) -> usize {
        self.validity().iter().filter(|v| **v).count()
    }
}

/// Evaluate every rule whose columns are present. Rules with a missing column
/// are skipped.
pub fn evaluate_business_rules(batch: &RecordBatch, now: NaiveDateTime) -> RuleReport {
    let outcomes = BusinessRule::ALL
        .into_iter()
        .filter(|rule| rule.required_columns().iter().all(|c| batch.has_column(c)))
        .map(|rule| RuleOutcome {
            rule,
            violating_rows: (0..batch.height())
                .filter(|&row| rule.violated_by(batch, row, now))
                .collect(),
        })
        .collect();
    RuleReport {
        total_rows: batch.height(),
        outcomes,
    }
}

/// Add or overwrite `is_valid` from the applicable rules.
pub fn validate_business_rules(
    mut batch: RecordBatch,
    now: NaiveDateTime,
    sink: &mut dyn EventSink,
) -> Result<RecordBatch> {
    let report = evaluate_business_rules(&batch, now);
    for outcome in &report.outcomes {
        sink.emit(PipelineEvent::RuleEvaluated {
            rule: outcome.rule.id().to_string(),
            violations: outcome.violating_rows.len(),
        });
    }
    let validity = report.validity();
    let valid = validity.iter().filter(|v| **v).count();
    batch.upsert_column(
        ColumnMeta::new(IS_VALID_COLUMN, SemanticType::Boolean),
        validity.into_iter().map(Value::Bool).collect(),
    )?;
    sink.emit(PipelineEvent::ValidationCompleted {
        valid,
        total: batch.height(),
    });
    Ok(batch)
}
