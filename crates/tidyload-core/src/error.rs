use thiserror::Error;
use tidyload_model::BatchError;

/// Failures that abort a pipeline run.
///
/// Row-level and column-level data defects are reported as events and never
/// surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("malformed batch: {0}")]
    MalformedBatch(#[from] BatchError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
