//! Tests for delimited-file extraction.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use tidyload_ingest::{ExtractOptions, IngestError, data_info, read_delimited};
use tidyload_model::{SemanticType, Value};

fn temp_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

const CUSTOMERS: &str = "\
customer_id,first_name,email,phone,registration_date,total_spent,active
1,ada,ada@example.com,(555) 123-4567,2023-01-15,120.5,true
2,  grace ,N/A,NULL,2023-02-01,,false
3,linus,linus@example,555.987.6543,2023-03-10,900,TRUE
";

#[test]
fn reads_and_types_columns() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "customers.csv", CUSTOMERS);
    let options = ExtractOptions::default().with_parse_dates(["registration_date"]);
    let extraction = read_delimited(&path, &options).expect("read csv");

    assert_eq!(extraction.row_count, 3);
    assert_eq!(extraction.column_count, 7);
    let batch = &extraction.batch;
    assert_eq!(batch.semantic_type("customer_id"), Some(&SemanticType::Integer));
    assert_eq!(batch.semantic_type("total_spent"), Some(&SemanticType::Float));
    assert_eq!(batch.semantic_type("active"), Some(&SemanticType::Boolean));
    assert_eq!(
        batch.semantic_type("registration_date"),
        Some(&SemanticType::Datetime)
    );
    assert_eq!(batch.value(1, "first_name"), Some(&Value::str("  grace ")));
    assert_eq!(batch.value(1, "email"), Some(&Value::Null));
    assert_eq!(extraction.null_counts["phone"], 1);
    assert_eq!(extraction.null_counts["total_spent"], 1);
}

#[test]
fn custom_na_values_and_delimiter() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "semi.csv", "a;b\n1;missing\n2;x\n");
    let options = ExtractOptions {
        delimiter: b';',
        na_values: vec!["missing".to_string()],
        ..ExtractOptions::default()
    };
    let extraction = read_delimited(&path, &options).expect("read csv");
    assert_eq!(extraction.batch.value(0, "b"), Some(&Value::Null));
    assert_eq!(extraction.batch.value(1, "b"), Some(&Value::str("x")));
}

#[test]
fn short_rows_are_padded_with_nulls() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "short.csv", "a,b,c\n1,2\n");
    let extraction = read_delimited(&path, &ExtractOptions::default()).expect("read csv");
    assert_eq!(extraction.batch.value(0, "c"), Some(&Value::Null));
}

#[test]
fn long_rows_are_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "long.csv", "a,b\n1,2,3\n");
    let err = read_delimited(&path, &ExtractOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        IngestError::TooManyFields {
            expected: 2,
            found: 3,
            ..
        }
    ));
}

#[test]
fn missing_and_empty_files() {
    let dir = TempDir::new().expect("temp dir");
    let err = read_delimited(&dir.path().join("nope.csv"), &ExtractOptions::default())
        .unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));

    let err = read_delimited(dir.path(), &ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::NotAFile { .. }));

    let path = temp_file(&dir, "empty.csv", "");
    let err = read_delimited(&path, &ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::EmptyCsv { .. }));
}

#[test]
fn unknown_date_column_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "dates.csv", "a\n1\n");
    let options = ExtractOptions::default().with_parse_dates(["signup"]);
    let err = read_delimited(&path, &options).unwrap_err();
    insta::assert_snapshot!(
        err.to_string().replace(&path.display().to_string(), "<path>"),
        @"date column 'signup' not found in <path>"
    );
}

#[test]
fn header_only_file_yields_empty_batch() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "header.csv", "\u{feff}a,b,a\n");
    let extraction = read_delimited(&path, &ExtractOptions::default()).expect("read csv");
    assert_eq!(extraction.row_count, 0);
    assert_eq!(extraction.batch.column_names(), vec!["a", "b", "a.1"]);
    assert_eq!(data_info(&extraction.batch).duplicate_rows, 0);
}
