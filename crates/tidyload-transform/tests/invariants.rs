//! Property tests for the transformation stage invariants.

use std::collections::BTreeMap;

use proptest::prelude::*;
use regex::Regex;

use tidyload_model::{
    MissingValueStrategy, NullRendering, NullSink, RecordBatch, TextOperation, Value,
};
use tidyload_transform::{
    apply_operations, normalize_text, resolve_missing, validate_email, validate_phone,
};

fn cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i64>().prop_map(Value::Int),
        "[ -~]{0,20}".prop_map(Value::Str),
        "[0-9()+. -]{0,16}".prop_map(Value::Str),
        "[a-z.]{1,8}@[a-z]{1,8}\\.[a-z]{1,4}".prop_map(Value::Str),
    ]
}

fn single_column(name: &str, values: Vec<Value>) -> RecordBatch {
    RecordBatch::from_rows(&[name], values.into_iter().map(|v| vec![v]).collect())
        .expect("single column batch")
}

proptest! {
    #[test]
    fn phone_cells_are_null_or_formatted(values in prop::collection::vec(cell(), 0..40)) {
        let pattern = Regex::new(r"^\d{3}-\d{3}-\d{4}$").unwrap();
        let out = validate_phone(single_column("phone", values), "phone", &mut NullSink).unwrap();
        for value in out.column_values("phone").unwrap() {
            match value {
                Value::Null => {}
                Value::Str(text) => prop_assert!(pattern.is_match(&text), "bad phone {text}"),
                other => prop_assert!(false, "unexpected cell {other:?}"),
            }
        }
    }

    #[test]
    fn phone_validation_is_idempotent(values in prop::collection::vec(cell(), 0..40)) {
        let once = validate_phone(single_column("phone", values), "phone", &mut NullSink).unwrap();
        let twice = validate_phone(once.clone(), "phone", &mut NullSink).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn email_cells_are_null_or_well_formed(values in prop::collection::vec(cell(), 0..40)) {
        let pattern = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
        let out = validate_email(single_column("email", values), "email", &mut NullSink).unwrap();
        for value in out.column_values("email").unwrap() {
            match value {
                Value::Null => {}
                Value::Str(text) => prop_assert!(pattern.is_match(&text)),
                other => prop_assert!(false, "unexpected cell {other:?}"),
            }
        }
    }

    #[test]
    fn strip_lower_reaches_a_fixed_point(text in "\\PC{0,30}") {
        let ops = [TextOperation::Strip, TextOperation::Lower];
        let once = apply_operations(&text, &ops);
        let twice = apply_operations(&once, &ops);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalizing_a_column_twice_changes_nothing(values in prop::collection::vec(cell(), 0..20)) {
        let columns = vec!["city".to_string()];
        let ops = [TextOperation::Strip, TextOperation::Lower];
        let once = normalize_text(
            single_column("city", values),
            &columns,
            &ops,
            NullRendering::Nan,
            &mut NullSink,
        )
        .unwrap();
        let twice =
            normalize_text(once.clone(), &columns, &ops, NullRendering::Nan, &mut NullSink)
                .unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn drop_keeps_exactly_rows_without_nulls(
        rows in prop::collection::vec(
            (prop::option::of(0i64..5), prop::option::of(0i64..5)),
            0..30,
        )
    ) {
        let batch = RecordBatch::from_rows(
            &["a", "b"],
            rows.iter().map(|(a, b)| vec![Value::from(*a), Value::from(*b)]).collect(),
        )
        .unwrap();
        let out = resolve_missing(batch, &BTreeMap::new(), &mut NullSink).unwrap();
        let expected: Vec<Vec<Value>> = rows
            .iter()
            .filter(|(a, b)| a.is_some() && b.is_some())
            .map(|(a, b)| vec![Value::from(*a), Value::from(*b)])
            .collect();
        prop_assert_eq!(out.rows(), expected.as_slice());
    }

    #[test]
    fn drop_only_applies_to_drop_columns(
        rows in prop::collection::vec(
            (prop::option::of(0i64..5), prop::option::of(0i64..5)),
            0..30,
        )
    ) {
        let batch = RecordBatch::from_rows(
            &["a", "b"],
            rows.iter().map(|(a, b)| vec![Value::from(*a), Value::from(*b)]).collect(),
        )
        .unwrap();
        let strategies = BTreeMap::from([(
            "b".to_string(),
            MissingValueStrategy::Fill(Value::Int(-1)),
        )]);
        let out = resolve_missing(batch, &strategies, &mut NullSink).unwrap();
        let survivors = rows.iter().filter(|(a, _)| a.is_some()).count();
        prop_assert_eq!(out.height(), survivors);
        prop_assert_eq!(out.null_count("b"), 0);
    }
}
