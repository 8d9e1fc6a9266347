//! Email and phone validators with normalize-or-null semantics.
//!
//! Neither validator drops rows. A cell that does not pass is set to null and
//! the number of nulled cells is reported.

use std::sync::LazyLock;

use regex::Regex;
use tidyload_model::{
    EventSink, NullRendering, PipelineEvent, RecordBatch, Result, SemanticType, Stage, Value,
};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("Invalid email regex")
});

/// Length of a `DDD-DDD-DDDD` phone number.
pub const FORMATTED_PHONE_LEN: usize = 12;

pub fn is_valid_email(text: &str) -> bool {
    EMAIL_REGEX.is_match(text)
}

/// Null every cell of `column` that is not a well-formed email address.
pub fn validate_email(
    mut batch: RecordBatch,
    column: &str,
    sink: &mut dyn EventSink,
) -> Result<RecordBatch> {
    if !batch.has_column(column) {
        return Ok(batch);
    }
    let mut nulled = 0usize;
    batch.map_column(column, |value| {
        let keep = match value {
            Value::Str(text) | Value::Category(text) => is_valid_email(text),
            _ => false,
        };
        if keep {
            value.clone()
        } else {
            if !value.is_null() {
                nulled += 1;
            }
            Value::Null
        }
    });
    sink.emit(PipelineEvent::CellsNulled {
        stage: Stage::EmailValidation,
        column: column.to_string(),
        count: nulled,
    });
    Ok(batch)
}

/// Format a phone number as `DDD-DDD-DDDD`.
///
/// Every non-digit is stripped first. Only exactly ten digits survive, so a
/// value already in the target layout maps to itself.
pub fn format_phone(text: &str) -> Option<String> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 {
        return None;
    }
    let formatted = format!("{}-{}-{}", &digits[0..3], &digits[3..6], &digits[6..10]);
    debug_assert_eq!(formatted.len(), FORMATTED_PHONE_LEN);
    Some(formatted)
}

/// Normalize every cell of `column` to `DDD-DDD-DDDD` or null.
pub fn validate_phone(
    mut batch: RecordBatch,
    column: &str,
    sink: &mut dyn EventSink,
) -> Result<RecordBatch> {
    if !batch.has_column(column) {
        return Ok(batch);
    }
    let mut nulled = 0usize;
    batch.map_column(column, |value| {
        let formatted = value
            .to_text(NullRendering::Keep)
            .and_then(|text| format_phone(&text));
        match formatted {
            Some(phone) => Value::Str(phone),
            None => {
                if !value.is_null() {
                    nulled += 1;
                }
                Value::Null
            }
        }
    });
    batch.set_semantic_type(column, SemanticType::String);
    sink.emit(PipelineEvent::CellsNulled {
        stage: Stage::PhoneValidation,
        column: column.to_string(),
        count: nulled,
    });
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidyload_model::RecordingSink;

    fn single(column: &str, values: Vec<Value>) -> RecordBatch {
        RecordBatch::from_rows(&[column], values.into_iter().map(|v| vec![v]).collect()).unwrap()
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("jane.doe+tag@example.co.uk"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane@example.c"));
        assert!(!is_valid_email(" jane@example.com"));
        assert!(!is_valid_email("nan"));
    }

    #[test]
    fn invalid_emails_become_null() {
        let batch = single(
            "email",
            vec![Value::str("a@b.io"), Value::str("broken"), Value::Null],
        );
        let mut sink = RecordingSink::new();
        let out = validate_email(batch, "email", &mut sink).unwrap();
        assert_eq!(
            out.column_values("email").unwrap(),
            vec![Value::str("a@b.io"), Value::Null, Value::Null]
        );
        assert_eq!(
            sink.events(),
            &[PipelineEvent::CellsNulled {
                stage: Stage::EmailValidation,
                column: "email".to_string(),
                count: 1
            }]
        );
    }

    #[test]
    fn phone_reformats_ten_digits() {
        assert_eq!(format_phone("(555) 123-4567").as_deref(), Some("555-123-4567"));
        assert_eq!(format_phone("555.123.4567").as_deref(), Some("555-123-4567"));
        assert_eq!(format_phone("555-123-4567").as_deref(), Some("555-123-4567"));
        assert_eq!(format_phone("12345"), None);
        assert_eq!(format_phone("Unknown"), None);
    }

    #[test]
    fn twelve_digit_numbers_do_not_survive() {
        assert_eq!(format_phone("555123456789"), None);
    }

    #[test]
    fn phone_column_is_normalized() {
        let batch = single(
            "phone",
            vec![
                Value::str("(555) 123-4567"),
                Value::str("12345"),
                Value::Int(5551234567),
                Value::Null,
            ],
        );
        let out = validate_phone(batch, "phone", &mut RecordingSink::new()).unwrap();
        assert_eq!(
            out.column_values("phone").unwrap(),
            vec![
                Value::str("555-123-4567"),
                Value::Null,
                Value::str("555-123-4567"),
                Value::Null
            ]
        );
    }

    #[test]
    fn absent_columns_are_skipped() {
        let batch = single("other", vec![Value::str("x")]);
        let mut sink = RecordingSink::new();
        let out = validate_phone(batch.clone(), "phone", &mut sink).unwrap();
        assert_eq!(out, batch);
        assert!(sink.events().is_empty());
    }
}
