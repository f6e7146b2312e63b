//! Batch transformation of raw records
//!
//! This module applies the normalizer to every record of a run, isolating
//! per-record failures so one bad record never aborts the batch.

use crate::core::transform::normalize;
use crate::domain::{CanonicalRecord, RawRecord};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Maximum length of the title fragment used to identify a failed record
const TITLE_FRAGMENT_CHARS: usize = 50;

/// Result of transforming a batch
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Records that normalized successfully, in input order
    pub records: Vec<CanonicalRecord>,
    /// Number of records that failed
    pub failed: usize,
    /// Errors encountered
    pub errors: Vec<String>,
}

impl BatchResult {
    /// Create a new empty batch result
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            failed: 0,
            errors: Vec::new(),
        }
    }

    /// Add a normalized record
    pub fn add_success(&mut self, record: CanonicalRecord) {
        self.records.push(record);
    }

    /// Add a failed record
    pub fn add_failure(&mut self, error: String) {
        self.failed += 1;
        self.errors.push(error);
    }

    /// Number of records that normalized successfully
    pub fn successful(&self) -> usize {
        self.records.len()
    }
}

impl Default for BatchResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Transforms a batch, dropping records that fail
///
/// Every output record carries the same `job_run`. Output order is the order
/// of the successful inputs.
pub fn transform_batch(raws: &[RawRecord], job_run: DateTime<Utc>) -> Vec<CanonicalRecord> {
    transform_batch_detailed(raws, job_run).records
}

/// Transforms a batch and reports per-record failures
pub fn transform_batch_detailed(raws: &[RawRecord], job_run: DateTime<Utc>) -> BatchResult {
    let mut result = BatchResult::new();

    if raws.is_empty() {
        tracing::debug!("No records to transform");
        return result;
    }

    for (index, raw) in raws.iter().enumerate() {
        match normalize(raw, job_run) {
            Ok(record) => result.add_success(record),
            Err(e) => {
                let fragment = identify(raw, index);
                tracing::error!(
                    record = %fragment,
                    index = index,
                    error = %e,
                    "Failed to transform record"
                );
                result.add_failure(format!("Transform failed for {fragment}: {e}"));
            }
        }
    }

    tracing::info!(
        total = raws.len(),
        transformed = result.successful(),
        dropped = result.failed,
        "Transformed batch of records"
    );

    result
}

/// Identifying fragment of a raw record: its id, else its title, else its index
fn identify(raw: &RawRecord, index: usize) -> String {
    let text = |key: &str| match raw.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    if let Some(id) = text("id") {
        return format!("id={id}");
    }
    if let Some(title) = text("title") {
        let fragment: String = title.chars().take(TITLE_FRAGMENT_CHARS).collect();
        return format!("title={fragment}");
    }
    format!("index={index}")
}
