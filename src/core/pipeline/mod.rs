//! Run orchestration
//!
//! - [`batch`] - Batch transformation with per-record failure isolation
//! - [`coordinator`] - Source → transform → sink wiring for one run
//! - [`metrics`] - Run metrics and exit code

pub mod batch;
pub mod coordinator;
pub mod metrics;

pub use batch::{transform_batch, transform_batch_detailed, BatchResult};
pub use coordinator::PipelineCoordinator;
pub use metrics::RunMetrics;
