//! Listing record models
//!
//! `RawRecord` is whatever JSON an upstream source produced. `CanonicalRecord`
//! is the schema-stable row every run appends to the analytical table.

use super::ids::ProductId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Untyped upstream record, normally a JSON object
pub type RawRecord = serde_json::Value;

/// Seller reputation summary taken from the seller profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerReputation {
    pub level_id: Option<String>,
    pub power_seller_status: Option<String>,
    pub transactions_total: i64,
    pub transactions_completed: i64,
}

/// One entry of the listing attribute map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub name: String,
    pub value: String,
}

/// Normalized, schema-stable listing row
///
/// Text columns are never null (empty string default). Numeric columns are
/// either a finite number or `None`. `images` is always a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub product_id: ProductId,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub condition: String,
    pub seller: String,
    pub currency: String,
    pub price: Option<f64>,
    pub price_string: Option<String>,
    pub rating: Option<f64>,
    pub reviews: Option<i64>,
    #[serde(rename = "sellCount")]
    pub sell_count: Option<i64>,
    pub images: Vec<String>,
    pub url: Option<String>,

    // Enriched listing columns, empty for scraped records
    pub category_id: String,
    pub thumbnail_url: String,
    pub seller_id: String,
    pub seller_reputation: Option<SellerReputation>,
    pub seller_power_seller_status: String,
    pub city: String,
    pub state: String,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub warranty: String,
    pub brand: String,
    pub model: String,
    pub memory: String,
    pub color: String,

    pub extraction_date: DateTime<Utc>,
    #[serde(rename = "JOB_RUN")]
    pub job_run: DateTime<Utc>,
}

impl CanonicalRecord {
    /// Creates a record with every optional column at its default
    pub fn new(product_id: ProductId, job_run: DateTime<Utc>) -> Self {
        Self {
            product_id,
            title: String::new(),
            subtitle: String::new(),
            description: String::new(),
            condition: String::new(),
            seller: String::new(),
            currency: String::new(),
            price: None,
            price_string: None,
            rating: None,
            reviews: None,
            sell_count: None,
            images: Vec::new(),
            url: None,
            category_id: String::new(),
            thumbnail_url: String::new(),
            seller_id: String::new(),
            seller_reputation: None,
            seller_power_seller_status: String::new(),
            city: String::new(),
            state: String::new(),
            attributes: BTreeMap::new(),
            warranty: String::new(),
            brand: String::new(),
            model: String::new(),
            memory: String::new(),
            color: String::new(),
            extraction_date: job_run,
            job_run,
        }
    }
}
