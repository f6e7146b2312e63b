//! Run metrics and reporting
//!
//! This module defines the summary produced by every pipeline run.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunMetrics {
    /// Run timestamp shared by every record of the run
    pub job_run: DateTime<Utc>,

    /// When the run started
    pub start_time: DateTime<Utc>,

    /// When the run finished
    pub end_time: Option<DateTime<Utc>>,

    /// Wall-clock duration of the run
    pub duration_seconds: f64,

    /// Number of raw records returned by the source
    pub records_extracted: usize,

    /// Number of records that normalized successfully
    pub records_transformed: usize,

    /// Number of records dropped by the normalizer
    pub records_dropped: usize,

    /// Number of rows appended to the sink
    pub records_loaded: usize,

    /// Whether the run succeeded
    pub success: bool,

    /// Errors encountered during the run
    pub errors: Vec<String>,

    /// Name of the extraction source
    pub source: String,

    /// Whether the run skipped DDL and writes
    pub dry_run: bool,
}

impl RunMetrics {
    /// Create metrics for a run that is starting now
    pub fn new(job_run: DateTime<Utc>, source: impl Into<String>, dry_run: bool) -> Self {
        Self {
            job_run,
            start_time: Utc::now(),
            end_time: None,
            duration_seconds: 0.0,
            records_extracted: 0,
            records_transformed: 0,
            records_dropped: 0,
            records_loaded: 0,
            success: false,
            errors: Vec::new(),
            source: source.into(),
            dry_run,
        }
    }

    /// Record a run-level error
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Stamp the end time and duration
    pub fn finish(&mut self) {
        let end = Utc::now();
        self.duration_seconds = (end - self.start_time).num_milliseconds() as f64 / 1000.0;
        self.end_time = Some(end);
    }

    /// Process exit code for this run
    pub fn exit_code(&self) -> i32 {
        if self.success {
            0
        } else {
            1
        }
    }

    /// Log the metrics
    pub fn log_metrics(&self) {
        tracing::info!(
            job_run = %self.job_run.to_rfc3339(),
            source = %self.source,
            records_extracted = self.records_extracted,
            records_transformed = self.records_transformed,
            records_dropped = self.records_dropped,
            records_loaded = self.records_loaded,
            duration_secs = format!("{:.2}", self.duration_seconds),
            success = self.success,
            dry_run = self.dry_run,
            "Pipeline run completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(error_count = self.errors.len(), "Pipeline run had errors");
            for error in &self.errors {
                tracing::warn!(message = %error, "Run error");
            }
        }
    }
}
