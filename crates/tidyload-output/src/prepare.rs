use tidyload_model::{RecordBatch, SemanticType, Value};

/// Placeholder spellings left behind by text rendering of nulls.
const NULL_PLACEHOLDERS: [&str; 2] = ["nan", "None"];

/// Clean a batch for loading.
///
/// String cells spelled `nan` or `None` become null and categorical columns
/// are flattened to plain strings.
pub fn prepare_for_load(mut batch: RecordBatch) -> RecordBatch {
    for column in batch.columns().to_vec() {
        match column.semantic_type {
            SemanticType::Categorical { .. } => {
                batch.map_column(&column.name, flatten_category);
                batch.set_semantic_type(&column.name, SemanticType::String);
            }
            SemanticType::String => {
                batch.map_column(&column.name, |value| match value {
                    Value::Str(text) if NULL_PLACEHOLDERS.contains(&text.as_str()) => Value::Null,
                    other => flatten_category(other),
                });
            }
            _ => {}
        }
    }
    batch
}

fn flatten_category(value: &Value) -> Value {
    match value {
        Value::Category(label) => Value::Str(label.clone()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_become_null() {
        let batch = RecordBatch::from_rows(
            &["name"],
            vec![
                vec![Value::str("nan")],
                vec![Value::str("None")],
                vec![Value::str("Nan")],
                vec![Value::str("ada")],
            ],
        )
        .unwrap();
        let prepared = prepare_for_load(batch);
        assert_eq!(
            prepared.column_values("name").unwrap(),
            vec![Value::Null, Value::Null, Value::str("Nan"), Value::str("ada")]
        );
    }

    #[test]
    fn categories_become_strings() {
        let batch = RecordBatch::from_rows(
            &["tier"],
            vec![
                vec![Value::Category("Gold".to_string())],
                vec![Value::Null],
            ],
        )
        .unwrap();
        assert!(matches!(
            batch.semantic_type("tier"),
            Some(SemanticType::Categorical { .. })
        ));
        let prepared = prepare_for_load(batch);
        assert_eq!(prepared.semantic_type("tier"), Some(&SemanticType::String));
        assert_eq!(prepared.value(0, "tier"), Some(&Value::str("Gold")));
    }
}
