//! Orchestration of the tidyload transformation stages.

pub mod clock;
pub mod error;
pub mod observer;
pub mod pipeline;
pub mod report;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{PipelineError, Result};
pub use observer::{Tee, TracingSink};
pub use pipeline::{PipelineOutput, TransformPipeline};
pub use report::{RunReport, StageReport, quality_score};
