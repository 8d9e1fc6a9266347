pub mod batch;
pub mod config;
pub mod error;
pub mod events;
pub mod value;

pub use batch::{ColumnMeta, RecordBatch, SemanticType};
pub use config::{KeepPolicy, MissingValueStrategy, TextOperation, TransformConfig};
pub use error::{BatchError, Result};
pub use events::{EventSink, NullSink, PipelineEvent, RecordingSink, Stage};
pub use value::{NULL_TEXT, NullRendering, TIMESTAMP_FORMAT, Value, ValueKey, ValueKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        sink.emit(PipelineEvent::StageStarted {
            stage: Stage::MissingValues,
            rows: 3,
        });
        sink.emit(PipelineEvent::DuplicatesRemoved { removed: 1 });
        assert_eq!(sink.events().len(), 2);
        assert!(matches!(
            sink.events()[1],
            PipelineEvent::DuplicatesRemoved { removed: 1 }
        ));
    }

    #[test]
    fn event_serializes_with_tag() {
        let event = PipelineEvent::CellsNulled {
            stage: Stage::PhoneValidation,
            column: "phone".to_string(),
            count: 2,
        };
        let json = serde_json::to_string(&event).expect("serialize event");
        assert_eq!(
            json,
            r#"{"event":"cells_nulled","stage":"phone_validation","column":"phone","count":2}"#
        );
    }
}
