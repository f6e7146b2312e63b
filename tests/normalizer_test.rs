//! Integration tests for record normalization and batch transformation

use chrono::{DateTime, TimeZone, Utc};
use meli_etl::core::pipeline::{transform_batch, transform_batch_detailed};
use meli_etl::core::transform::identity::sha1_hex;
use meli_etl::core::transform::normalize;
use meli_etl::domain::TransformError;
use serde_json::json;

fn job_run() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

#[test]
fn test_scraped_listing_end_to_end() {
    let raw = json!({
        "title": "Phone X",
        "price": "1.299,00",
        "currency": "ARS",
        "url": "http://x/1"
    });

    let record = normalize(&raw, job_run()).unwrap();

    assert_eq!(record.product_id.as_str(), sha1_hex("http://x/1"));
    assert_eq!(record.title, "Phone X");
    assert_eq!(record.currency, "ARS");
    assert_eq!(record.price, Some(1299.0));
    assert_eq!(record.price_string.as_deref(), Some("1.299,00"));
    assert!(record.images.is_empty());
    assert_eq!(record.url.as_deref(), Some("http://x/1"));
    assert_eq!(record.extraction_date, job_run());
    assert_eq!(record.job_run, job_run());
    assert!(record.seller_reputation.is_none());
}

#[test]
fn test_enriched_listing_end_to_end() {
    let raw = json!({
        "id": "MLA123",
        "title": "Samsung Galaxy S24\n256GB",
        "price": 1645944.69,
        "currency_id": "ARS",
        "condition": "new",
        "thumbnail": "http://img/thumb.jpg",
        "permalink": "http://x/MLA123",
        "category_id": "MLA1055",
        "seller_id": 99,
        "seller": {"id": 99, "nickname": "TECHSTORE"},
        "address": {"city_name": "Palermo", "state_name": "Capital Federal"},
        "attributes": [
            {"id": "BRAND", "name": "Marca", "value_name": "Samsung"},
            {"id": "MODEL", "name": "Modelo", "value_name": "Galaxy S24"},
            {"id": "INTERNAL_MEMORY", "name": "Memoria interna", "value_name": "256 GB"},
            {"id": "COLOR", "name": "Color", "value_name": "Negro"}
        ],
        "pictures": [{"url": "http://img/1.jpg"}, {"secure_url": "https://img/2.jpg"}],
        "warranty": "12 meses",
        "seller_info": {
            "seller_reputation": {
                "level_id": "5_green",
                "power_seller_status": "platinum",
                "transactions": {"total": 1200, "completed": 1180}
            }
        },
        "extraction_date": "2025-03-01T11:58:00.123456Z"
    });

    let record = normalize(&raw, job_run()).unwrap();

    assert_eq!(record.product_id.as_str(), "MLA123");
    assert_eq!(record.title, "Samsung Galaxy S24 256GB");
    assert_eq!(record.seller, "TECHSTORE");
    assert_eq!(record.seller_id, "99");
    assert_eq!(record.currency, "ARS");
    assert_eq!(record.price, Some(1645944.69));
    assert_eq!(record.url.as_deref(), Some("http://x/MLA123"));
    assert_eq!(record.city, "Palermo");
    assert_eq!(record.state, "Capital Federal");
    assert_eq!(record.brand, "Samsung");
    assert_eq!(record.model, "Galaxy S24");
    assert_eq!(record.memory, "256 GB");
    assert_eq!(record.color, "Negro");
    assert_eq!(record.warranty, "12 meses");
    assert_eq!(record.seller_power_seller_status, "platinum");
    assert_eq!(record.attributes.len(), 4);
    assert_eq!(record.images, vec!["https://img/2.jpg".to_string()]);
    assert_eq!(
        record.extraction_date,
        Utc.with_ymd_and_hms(2025, 3, 1, 11, 58, 0).unwrap()
            + chrono::Duration::microseconds(123456)
    );
    assert_eq!(record.job_run, job_run());

    let reputation = record.seller_reputation.unwrap();
    assert_eq!(reputation.level_id.as_deref(), Some("5_green"));
    assert_eq!(reputation.transactions_total, 1200);
}

#[test]
fn test_unparseable_price_keeps_original_text() {
    let record = normalize(
        &json!({"title": "Phone", "seller": "shop", "price": "consultar"}),
        job_run(),
    )
    .unwrap();

    assert_eq!(record.price, None);
    assert_eq!(record.price_string.as_deref(), Some("consultar"));
}

#[test]
fn test_id_derivation_without_url_uses_title_and_seller() {
    let a = normalize(&json!({"title": "Phone", "seller": "shop"}), job_run()).unwrap();
    let b = normalize(&json!({"title": "Phone", "seller": "shop"}), job_run()).unwrap();
    let c = normalize(&json!({"title": "Phone", "seller": "other"}), job_run()).unwrap();

    assert_eq!(a.product_id, b.product_id);
    assert_ne!(a.product_id, c.product_id);
    assert_eq!(a.product_id.as_str().len(), 40);
}

#[test]
fn test_unusable_id_is_rejected() {
    let err = normalize(&json!({"id": {"nested": true}, "title": "x"}), job_run()).unwrap_err();
    assert!(matches!(err, TransformError::UnsupportedFieldType { .. }));
}

#[test]
fn test_batch_isolates_failures_and_preserves_order() {
    let raws = vec![
        json!({"id": "MLA1", "title": "first"}),
        json!("garbage"),
        json!({"id": ["bad"], "title": "broken"}),
        json!({"id": "MLA2", "title": "second"}),
    ];

    let result = transform_batch_detailed(&raws, job_run());

    assert_eq!(result.successful(), 2);
    assert_eq!(result.failed, 2);
    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.records[0].product_id.as_str(), "MLA1");
    assert_eq!(result.records[1].product_id.as_str(), "MLA2");
    assert!(result.records.iter().all(|r| r.job_run == job_run()));
}

#[test]
fn test_transform_batch_empty_input() {
    assert!(transform_batch(&[], job_run()).is_empty());
}
