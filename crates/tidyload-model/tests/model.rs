//! Tests for the record batch invariants.

use tidyload_model::{BatchError, ColumnMeta, RecordBatch, SemanticType, Value};

fn sample() -> RecordBatch {
    RecordBatch::from_rows(
        &["id", "name", "score"],
        vec![
            vec![Value::Int(1), Value::str("ada"), Value::Float(1.5)],
            vec![Value::Int(2), Value::Null, Value::Int(3)],
            vec![Value::Int(3), Value::str("lin"), Value::Null],
        ],
    )
    .expect("valid batch")
}

#[test]
fn infers_column_types() {
    let batch = sample();
    assert_eq!(batch.semantic_type("id"), Some(&SemanticType::Integer));
    assert_eq!(batch.semantic_type("name"), Some(&SemanticType::String));
    assert_eq!(batch.semantic_type("score"), Some(&SemanticType::Float));
}

#[test]
fn rejects_duplicate_columns() {
    let err = RecordBatch::from_rows(&["a", "a"], vec![]).unwrap_err();
    assert_eq!(err, BatchError::DuplicateColumn("a".to_string()));
}

#[test]
fn rejects_ragged_rows() {
    let err = RecordBatch::from_rows(&["a", "b"], vec![vec![Value::Int(1)]]).unwrap_err();
    assert_eq!(
        err,
        BatchError::RaggedRow {
            row: 0,
            expected: 2,
            found: 1
        }
    );
}

#[test]
fn null_counts_per_column() {
    let counts = sample().null_counts();
    assert_eq!(counts["id"], 0);
    assert_eq!(counts["name"], 1);
    assert_eq!(counts["score"], 1);
}

#[test]
fn upsert_appends_then_replaces() {
    let mut batch = sample();
    batch
        .upsert_column(
            ColumnMeta::new("flag", SemanticType::Boolean),
            vec![Value::Bool(true); 3],
        )
        .expect("append");
    assert_eq!(batch.column_names().last().map(String::as_str), Some("flag"));

    batch
        .upsert_column(
            ColumnMeta::new("name", SemanticType::String),
            vec![Value::str("x"), Value::str("y"), Value::str("z")],
        )
        .expect("replace");
    assert_eq!(batch.width(), 4);
    assert_eq!(batch.column_index("name"), Some(1));
    assert_eq!(batch.value(1, "name"), Some(&Value::str("y")));
}

#[test]
fn retain_rows_preserves_order() {
    let mut batch = sample();
    batch.retain_rows(&[true, false, true]).expect("mask");
    let ids = batch.column_values("id").expect("id column");
    assert_eq!(ids, vec![Value::Int(1), Value::Int(3)]);

    let err = batch.retain_rows(&[true]).unwrap_err();
    assert_eq!(
        err,
        BatchError::MaskLength {
            expected: 2,
            found: 1
        }
    );
}

#[test]
fn column_length_is_checked() {
    let mut batch = sample();
    let err = batch
        .replace_column_values("id", vec![Value::Null])
        .unwrap_err();
    assert!(matches!(err, BatchError::ColumnLength { .. }));
    let err = batch.replace_column_values("missing", vec![]).unwrap_err();
    assert_eq!(err, BatchError::UnknownColumn("missing".to_string()));
}

#[test]
fn categorical_accepts_only_known_labels() {
    let ty = SemanticType::Categorical {
        categories: vec!["Gold".to_string()],
    };
    assert!(ty.accepts(&Value::Category("Gold".to_string())));
    assert!(!ty.accepts(&Value::Category("Silver".to_string())));
    assert!(ty.accepts(&Value::Null));
}

#[test]
fn batch_round_trips_through_json() {
    let batch = sample();
    let json = serde_json::to_string(&batch).expect("serialize");
    let back: RecordBatch = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.column_names(), batch.column_names());
    assert_eq!(back.height(), 3);
}

#[test]
fn decoding_checks_batch_structure() {
    let duplicate = r#"{"columns":[
        {"name":"a","semantic_type":{"type":"string"}},
        {"name":"a","semantic_type":{"type":"string"}}
    ],"rows":[]}"#;
    let err = serde_json::from_str::<RecordBatch>(duplicate).unwrap_err();
    assert!(err.to_string().contains("duplicate column name: a"));

    let ragged = r#"{"columns":[{"name":"a","semantic_type":{"type":"string"}}],"rows":[[
        {"kind":"str","value":"x"},
        {"kind":"str","value":"y"}
    ]]}"#;
    let err = serde_json::from_str::<RecordBatch>(ragged).unwrap_err();
    assert!(err.to_string().contains("row 0 has 2 cells, expected 1"));
}
