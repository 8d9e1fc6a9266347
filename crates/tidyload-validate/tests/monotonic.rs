//! Property tests for `is_valid` monotonicity.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use tidyload_model::{NullSink, RecordBatch, Value};
use tidyload_validate::{
    BusinessRule, IS_VALID_COLUMN, evaluate_business_rules, validate_business_rules,
};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn day(offset: i64) -> Value {
    Value::Timestamp(now() + Duration::days(offset))
}

proptest! {
    #[test]
    fn a_row_is_valid_iff_no_rule_fires(
        rows in prop::collection::vec((-400i64..400, -400i64..400, -50i64..50), 0..25)
    ) {
        let batch = RecordBatch::from_rows(
            &["registration_date", "last_purchase_date", "total_spent"],
            rows.iter()
                .map(|(reg, purchase, spent)| vec![day(*reg), day(*purchase), Value::Int(*spent)])
                .collect(),
        )
        .unwrap();
        let report = evaluate_business_rules(&batch, now());
        let out = validate_business_rules(batch, now(), &mut NullSink).unwrap();
        let flags = out.column_values(IS_VALID_COLUMN).unwrap();

        for (idx, (reg, purchase, spent)) in rows.iter().enumerate() {
            let expected = !(*reg > 0 || purchase < reg || *spent < 0);
            prop_assert_eq!(&flags[idx], &Value::Bool(expected));
            prop_assert_eq!(report.reasons(idx).is_empty(), expected);
        }
        prop_assert_eq!(report.outcomes.len(), BusinessRule::ALL.len());
    }

    #[test]
    fn revalidating_never_restores_failed_rows(
        spent in prop::collection::vec(-10i64..10, 0..25)
    ) {
        let batch = RecordBatch::from_rows(
            &["total_spent"],
            spent.iter().map(|s| vec![Value::Int(*s)]).collect(),
        )
        .unwrap();
        let once = validate_business_rules(batch, now(), &mut NullSink).unwrap();
        let twice = validate_business_rules(once.clone(), now(), &mut NullSink).unwrap();
        prop_assert_eq!(
            once.column_values(IS_VALID_COLUMN),
            twice.column_values(IS_VALID_COLUMN)
        );
    }
}
