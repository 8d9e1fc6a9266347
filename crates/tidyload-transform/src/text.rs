//! String normalization.
//!
//! Every operation works on the text form of a cell. Under
//! [`NullRendering::Nan`] a null cell is first rendered as `"nan"` and then
//! normalized like any other string; under [`NullRendering::Keep`] null cells
//! are skipped.

use tidyload_model::{
    EventSink, NullRendering, PipelineEvent, RecordBatch, Result, SemanticType, TextOperation,
    Value,
};

/// Apply `operations` in order to each listed column that exists.
pub fn normalize_text(
    mut batch: RecordBatch,
    columns: &[String],
    operations: &[TextOperation],
    nulls: NullRendering,
    sink: &mut dyn EventSink,
) -> Result<RecordBatch> {
    for column in columns {
        if !batch.has_column(column) {
            continue;
        }
        batch.map_column(column, |value| match value.to_text(nulls) {
            Some(text) => Value::Str(apply_operations(&text, operations)),
            None => Value::Null,
        });
        batch.set_semantic_type(column, SemanticType::String);
        sink.emit(PipelineEvent::TextNormalized {
            column: column.clone(),
            operations: operations.iter().map(|op| op.as_str().to_string()).collect(),
        });
    }
    Ok(batch)
}

pub fn apply_operations(text: &str, operations: &[TextOperation]) -> String {
    operations
        .iter()
        .fold(text.to_string(), |acc, op| apply_operation(&acc, *op))
}

pub fn apply_operation(text: &str, operation: TextOperation) -> String {
    match operation {
        TextOperation::Strip => text.trim().to_string(),
        TextOperation::Lower => text.to_lowercase(),
        TextOperation::Upper => text.to_uppercase(),
        TextOperation::Title => title_case(text),
        TextOperation::RemoveSpecial => text
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric() || ch.is_whitespace())
            .collect(),
    }
}

/// Upper-case a letter that follows a non-letter, lower-case every other letter.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(ch);
            previous_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use tidyload_model::RecordingSink;

    #[test]
    fn title_uses_word_boundaries() {
        assert_snapshot!(title_case("mary-jane o'neil  SMITH"), @"Mary-Jane O'Neil  Smith");
        assert_snapshot!(title_case("3rd street"), @"3Rd Street");
    }

    #[test]
    fn remove_special_keeps_alphanumerics_and_whitespace() {
        assert_eq!(
            apply_operation("Café #12, Ave.", TextOperation::RemoveSpecial),
            "Caf 12 Ave"
        );
    }

    #[test]
    fn operations_chain_in_order() {
        let ops = [TextOperation::Strip, TextOperation::Upper];
        assert_eq!(apply_operations("  oslo ", &ops), "OSLO");
    }

    #[test]
    fn null_renders_as_nan_by_default() {
        let batch = RecordBatch::from_rows(
            &["city", "zip"],
            vec![
                vec![Value::str(" oslo "), Value::Int(1)],
                vec![Value::Null, Value::Int(2)],
            ],
        )
        .unwrap();
        let columns = vec!["city".to_string(), "missing".to_string()];
        let ops = [TextOperation::Strip, TextOperation::Title];

        let out = normalize_text(
            batch.clone(),
            &columns,
            &ops,
            NullRendering::Nan,
            &mut RecordingSink::new(),
        )
        .unwrap();
        assert_eq!(
            out.column_values("city").unwrap(),
            vec![Value::str("Oslo"), Value::str("Nan")]
        );

        let out = normalize_text(
            batch,
            &columns,
            &ops,
            NullRendering::Keep,
            &mut RecordingSink::new(),
        )
        .unwrap();
        assert_eq!(out.value(1, "city"), Some(&Value::Null));
        assert_eq!(out.value(0, "zip"), Some(&Value::Int(1)));
    }

    #[test]
    fn numbers_are_normalized_through_their_text_form() {
        let batch =
            RecordBatch::from_rows(&["code"], vec![vec![Value::Float(7.0)], vec![Value::Bool(true)]])
                .unwrap();
        let out = normalize_text(
            batch,
            &["code".to_string()],
            &[TextOperation::Lower],
            NullRendering::Nan,
            &mut RecordingSink::new(),
        )
        .unwrap();
        assert_eq!(
            out.column_values("code").unwrap(),
            vec![Value::str("7.0"), Value::str("true")]
        );
    }
}
