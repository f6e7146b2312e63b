//! Scraped listing shape
//!
//! Flat records produced by the scrape-job source. Prices arrive as locale
//! formatted strings and the id is usually absent.

use super::fields::{
    clean_text, image_list, optional_text, parse_decimal, parse_int, price_text,
    resolve_timestamp,
};
use super::identity::derive_product_id;
use crate::domain::{CanonicalRecord, TransformError};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

const SELL_COUNT_KEYS: [&str; 3] = ["sellCount", "sold", "sell_count"];
const REVIEW_KEYS: [&str; 2] = ["reviews", "reviewCount"];
const EXTRACTION_DATE_KEYS: [&str; 2] = ["extraction_date", "extractionDate"];

/// Normalizes a scraped listing record
pub fn normalize_scraped(
    record: &Map<String, Value>,
    job_run: DateTime<Utc>,
) -> Result<CanonicalRecord, TransformError> {
    let title = clean_text(record.get("title"));
    let seller = clean_text(record.get("seller"));
    let url = optional_text(record.get("url"));

    let product_id = derive_product_id(record, url.as_deref(), &title, &seller)?;
    let mut canonical = CanonicalRecord::new(product_id, job_run);

    canonical.title = title;
    canonical.subtitle = clean_text(record.get("subtitle"));
    canonical.description = clean_text(record.get("description"));
    canonical.condition = clean_text(record.get("condition"));
    canonical.seller = seller;
    canonical.currency = clean_text(record.get("currency"));
    canonical.price = parse_decimal(record.get("price"));
    canonical.price_string = price_text(record.get("price"));
    canonical.rating = parse_decimal(record.get("rating"));
    canonical.reviews = first_present(record, &REVIEW_KEYS).and_then(|v| parse_int(Some(v)));
    canonical.sell_count =
        first_present(record, &SELL_COUNT_KEYS).and_then(|v| parse_int(Some(v)));
    canonical.images = image_list(record.get("images"));
    if canonical.images.is_empty() {
        canonical.images = image_list(record.get("pictures"));
    }
    canonical.url = url;
    canonical.extraction_date =
        resolve_timestamp(first_present(record, &EXTRACTION_DATE_KEYS), job_run);

    Ok(canonical)
}

/// First non-null value among synonymous keys
fn first_present<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}
