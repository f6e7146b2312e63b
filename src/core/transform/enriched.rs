//! Enriched listing shape
//!
//! Records produced by the marketplace REST source: search result merged
//! with item detail and seller profile.

use super::fields::{
    clean_text, image_list, optional_text, parse_decimal, parse_int, price_text,
    resolve_timestamp,
};
use super::identity::derive_product_id;
use crate::domain::{AttributeValue, CanonicalRecord, SellerReputation, TransformError};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Normalizes an enriched listing record
pub fn normalize_enriched(
    record: &Map<String, Value>,
    job_run: DateTime<Utc>,
) -> Result<CanonicalRecord, TransformError> {
    let title = clean_text(record.get("title"));
    let seller = seller_name(record);
    let url = optional_text(record.get("permalink")).or_else(|| optional_text(record.get("url")));

    let product_id = derive_product_id(record, url.as_deref(), &title, &seller)?;
    let mut canonical = CanonicalRecord::new(product_id, job_run);

    canonical.title = title;
    canonical.subtitle = clean_text(record.get("subtitle"));
    canonical.description = clean_text(record.get("description"));
    canonical.condition = clean_text(record.get("condition"));
    canonical.seller = seller;
    canonical.currency = match record.get("currency_id") {
        Some(Value::String(_)) => clean_text(record.get("currency_id")),
        _ => clean_text(record.get("currency")),
    };
    canonical.price = parse_decimal(record.get("price"));
    canonical.price_string = price_text(record.get("price"));
    canonical.rating = parse_decimal(record.get("rating"));
    canonical.reviews = parse_int(record.get("reviews"));
    canonical.sell_count =
        parse_int(record.get("sold_quantity")).or_else(|| parse_int(record.get("sellCount")));
    canonical.images = picture_urls(record.get("pictures"));
    if canonical.images.is_empty() {
        canonical.images = image_list(record.get("images"));
    }
    canonical.url = url;

    canonical.category_id = clean_text(record.get("category_id"));
    canonical.thumbnail_url = clean_text(record.get("thumbnail"));
    canonical.seller_id = match record.get("seller_id") {
        Some(Value::Null) | None => clean_text(record.get("seller").and_then(|s| s.get("id"))),
        id => clean_text(id),
    };

    let seller_info = record.get("seller_info");
    canonical.seller_reputation = seller_info
        .filter(|info| info.is_object())
        .map(|info| seller_reputation(info.get("seller_reputation")));
    canonical.seller_power_seller_status =
        match seller_info.and_then(|info| info.get("power_seller_status")) {
            Some(status) if !status.is_null() => clean_text(Some(status)),
            _ => canonical
                .seller_reputation
                .as_ref()
                .and_then(|rep| rep.power_seller_status.clone())
                .unwrap_or_default(),
        };

    let address = record.get("address");
    canonical.city = clean_text(address.and_then(|a| a.get("city_name")));
    canonical.state = clean_text(address.and_then(|a| a.get("state_name")));

    let attributes = record.get("attributes").and_then(Value::as_array);
    if let Some(attributes) = attributes {
        canonical.attributes = attribute_map(attributes);
        canonical.brand = attribute_value(attributes, "BRAND");
        canonical.model = attribute_value(attributes, "MODEL");
        canonical.memory = attribute_value(attributes, "INTERNAL_MEMORY");
        canonical.color = attribute_value(attributes, "COLOR");
    }
    canonical.warranty = clean_text(record.get("warranty"));

    canonical.extraction_date = resolve_timestamp(record.get("extraction_date"), job_run);

    Ok(canonical)
}

fn seller_name(record: &Map<String, Value>) -> String {
    match record.get("seller").and_then(|s| s.get("nickname")) {
        Some(nickname) if !nickname.is_null() => clean_text(Some(nickname)),
        _ => clean_text(record.get("seller_nickname")),
    }
}

/// Reads `seller_reputation`, counts default to 0
pub fn seller_reputation(reputation: Option<&Value>) -> SellerReputation {
    let Some(reputation) = reputation.filter(|r| r.is_object()) else {
        return SellerReputation::default();
    };
    let transactions = reputation.get("transactions");

    SellerReputation {
        level_id: optional_text(reputation.get("level_id")),
        power_seller_status: optional_text(reputation.get("power_seller_status")),
        transactions_total: parse_int(transactions.and_then(|t| t.get("total"))).unwrap_or(0),
        transactions_completed: parse_int(transactions.and_then(|t| t.get("completed")))
            .unwrap_or(0),
    }
}

/// Builds the attribute map keyed by attribute id
///
/// Entries without an `id` or a `value_name` are skipped.
pub fn attribute_map(attributes: &[Value]) -> BTreeMap<String, AttributeValue> {
    let mut map = BTreeMap::new();
    for attribute in attributes {
        let id = optional_text(attribute.get("id"));
        let value = optional_text(attribute.get("value_name"));
        if let (Some(id), Some(value)) = (id, value) {
            map.insert(
                id,
                AttributeValue {
                    name: clean_text(attribute.get("name")),
                    value,
                },
            );
        }
    }
    map
}

/// Value of the first attribute with the given id, `""` when absent
pub fn attribute_value(attributes: &[Value], attribute_id: &str) -> String {
    attributes
        .iter()
        .find(|a| a.get("id").and_then(Value::as_str) == Some(attribute_id))
        .map(|a| clean_text(a.get("value_name")))
        .unwrap_or_default()
}

fn picture_urls(pictures: Option<&Value>) -> Vec<String> {
    pictures
        .and_then(Value::as_array)
        .map(|pictures| {
            pictures
                .iter()
                .filter_map(|p| p.get("secure_url").and_then(Value::as_str))
                .filter(|url| !url.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
