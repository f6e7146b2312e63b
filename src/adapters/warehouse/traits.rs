//! Record sink abstraction
//!
//! Sinks own the destination table: its creation (partitioned by `JOB_RUN`)
//! and the per-run append.

use crate::domain::{CanonicalRecord, Result};
use async_trait::async_trait;

/// Destination of canonical records
#[async_trait]
pub trait RecordSink {
    /// Short sink name used in logs
    fn name(&self) -> &str;

    /// Fully qualified destination table
    fn table_ref(&self) -> String;

    /// Create the destination table if it does not exist
    ///
    /// Idempotent: an existing table is a no-op. In dry-run mode no DDL is
    /// issued.
    async fn ensure_table(&self, dry_run: bool) -> Result<()>;

    /// Append a batch, all or nothing
    ///
    /// Returns the number of rows written. An empty batch returns 0 without
    /// contacting the warehouse; in dry-run mode nothing is written and the
    /// batch size is reported.
    async fn append(&self, records: &[CanonicalRecord], dry_run: bool) -> Result<usize>;
}
