//! Record normalization
//!
//! This module converts one raw upstream record into one canonical record.
//! Two upstream shapes are supported:
//!
//! - **Enriched**: marketplace REST listings with nested seller, attributes and pictures
//! - **Scraped**: flat scrape-job items with locale-formatted prices
//!
//! Normalization is pure: no I/O, identical inputs give identical outputs.

pub mod enriched;
pub mod fields;
pub mod identity;
pub mod scraped;

use crate::domain::{CanonicalRecord, RawRecord, TransformError};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;

/// Upstream record shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// Listing enriched with item detail and seller profile
    Enriched,
    /// Flat scrape-job item
    Scraped,
}

impl RecordShape {
    /// Detects the shape of a record by the capabilities it carries
    ///
    /// The `seller` field decides first: a nested object is enriched, a flat
    /// string is scraped. Without a seller, a `seller_info.seller_reputation`
    /// path or an `attributes`/`pictures` list mark the enriched shape.
    pub fn detect(record: &Map<String, Value>) -> Self {
        match record.get("seller") {
            Some(Value::Object(_)) => return Self::Enriched,
            Some(Value::String(_)) => return Self::Scraped,
            _ => {}
        }

        let has_reputation = record
            .get("seller_info")
            .and_then(|info| info.get("seller_reputation"))
            .is_some_and(|rep| !rep.is_null());
        let has_lists = ["attributes", "pictures"]
            .iter()
            .any(|key| record.get(*key).is_some_and(Value::is_array));

        if has_reputation || has_lists {
            Self::Enriched
        } else {
            Self::Scraped
        }
    }
}

impl fmt::Display for RecordShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enriched => write!(f, "enriched"),
            Self::Scraped => write!(f, "scraped"),
        }
    }
}

/// Normalizes a raw record into the canonical schema
///
/// Malformed fields degrade to null/empty defaults. Only structural problems
/// fail the record.
///
/// # Arguments
///
/// * `raw` - The upstream record
/// * `job_run` - The run timestamp shared by the whole batch
///
/// # Errors
///
/// Returns an error if the record is not a JSON object or its `id` has an
/// unsupported type.
///
/// # Examples
///
/// ```
/// use meli_etl::core::transform::normalize;
/// use chrono::Utc;
/// use serde_json::json;
///
/// let job_run = Utc::now();
/// let raw = json!({"title": "Phone X", "price": "1.299,00", "url": "http://x/1"});
/// let record = normalize(&raw, job_run).unwrap();
///
/// assert_eq!(record.price, Some(1299.0));
/// assert_eq!(record.job_run, job_run);
/// ```
pub fn normalize(raw: &RawRecord, job_run: DateTime<Utc>) -> Result<CanonicalRecord, TransformError> {
    let record = raw
        .as_object()
        .ok_or_else(|| TransformError::NotAnObject(fields::json_type_name(raw).to_string()))?;

    match RecordShape::detect(record) {
        RecordShape::Enriched => enriched::normalize_enriched(record, job_run),
        RecordShape::Scraped => scraped::normalize_scraped(record, job_run),
    }
}
