//! Batch transform of quarterly MSD reporting extracts into one harmonized,
//! long-format fact table.

pub mod config;
pub mod constants;
pub mod error;
pub mod fiscal;
pub mod frame;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod output;
pub mod pipeline;

pub use config::{Config, RunConfig};
pub use error::{PipelineError, Result};
pub use pipeline::{run, transform, PipelineInputs, RunSummary};
