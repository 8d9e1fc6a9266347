//! Library side of the `tidyload` command line runner.

pub mod config;
pub mod etl;
pub mod logging;
pub mod types;
