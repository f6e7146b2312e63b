//! Extraction source abstraction
//!
//! Each upstream (marketplace REST API, scrape-job actor API) implements
//! [`ExtractionSource`] so the coordinator can run either one unchanged.

use crate::domain::{RawRecord, Result};
use async_trait::async_trait;

/// A source of raw listing records
///
/// Implementations perform all network I/O for one run and return the full
/// bounded batch. Transient upstream failures are retried or degraded inside
/// the implementation; an error returned from [`extract`](Self::extract) is
/// run-fatal.
#[async_trait]
pub trait ExtractionSource {
    /// Short source name recorded in run metrics
    fn name(&self) -> &str;

    /// Fetch every raw record for this run
    async fn extract(&self) -> Result<Vec<RawRecord>>;
}
