//! Warehouse row serialization
//!
//! Defines the table columns shared by every sink and turns a
//! [`CanonicalRecord`] into a JSON row keyed by column name.

use crate::domain::{CanonicalRecord, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Logical column types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Float,
    Integer,
    Timestamp,
    Json,
}

/// Column nullability / cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMode {
    Required,
    Nullable,
    Repeated,
}

/// A table column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub mode: ColumnMode,
}

const fn column(name: &'static str, column_type: ColumnType, mode: ColumnMode) -> Column {
    Column {
        name,
        column_type,
        mode,
    }
}

/// Partition column of the listings table
pub const PARTITION_COLUMN: &str = "JOB_RUN";

/// Columns of the listings table, in row order
pub const COLUMNS: &[Column] = &[
    column("product_id", ColumnType::String, ColumnMode::Required),
    column("title", ColumnType::String, ColumnMode::Nullable),
    column("subtitle", ColumnType::String, ColumnMode::Nullable),
    column("description", ColumnType::String, ColumnMode::Nullable),
    column("condition", ColumnType::String, ColumnMode::Nullable),
    column("seller", ColumnType::String, ColumnMode::Nullable),
    column("currency", ColumnType::String, ColumnMode::Nullable),
    column("price", ColumnType::Float, ColumnMode::Nullable),
    column("price_string", ColumnType::String, ColumnMode::Nullable),
    column("rating", ColumnType::Float, ColumnMode::Nullable),
    column("reviews", ColumnType::Integer, ColumnMode::Nullable),
    column("sellCount", ColumnType::Integer, ColumnMode::Nullable),
    column("images", ColumnType::String, ColumnMode::Repeated),
    column("url", ColumnType::String, ColumnMode::Nullable),
    column("category_id", ColumnType::String, ColumnMode::Nullable),
    column("thumbnail_url", ColumnType::String, ColumnMode::Nullable),
    column("seller_id", ColumnType::String, ColumnMode::Nullable),
    column("seller_reputation", ColumnType::Json, ColumnMode::Nullable),
    column("seller_power_seller_status", ColumnType::String, ColumnMode::Nullable),
    column("city", ColumnType::String, ColumnMode::Nullable),
    column("state", ColumnType::String, ColumnMode::Nullable),
    column("attributes", ColumnType::Json, ColumnMode::Nullable),
    column("warranty", ColumnType::String, ColumnMode::Nullable),
    column("brand", ColumnType::String, ColumnMode::Nullable),
    column("model", ColumnType::String, ColumnMode::Nullable),
    column("memory", ColumnType::String, ColumnMode::Nullable),
    column("color", ColumnType::String, ColumnMode::Nullable),
    column("extraction_date", ColumnType::Timestamp, ColumnMode::Required),
    column(PARTITION_COLUMN, ColumnType::Timestamp, ColumnMode::Required),
];

/// How JSON-typed columns are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonEncoding {
    /// Nested JSON values (`jsonb` columns)
    Native,
    /// JSON rendered as a string (BigQuery load jobs)
    Text,
}

/// Format a timestamp as RFC 3339 UTC with microseconds and `Z`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serialize a record into a row keyed by column name
///
/// # Errors
///
/// Returns a serialization error if the record cannot be converted to JSON.
pub fn to_row(record: &CanonicalRecord, json: JsonEncoding) -> Result<Map<String, Value>> {
    let Value::Object(mut row) = serde_json::to_value(record)? else {
        return Err(crate::domain::PipelineError::Serialization(
            "canonical record did not serialize to an object".to_string(),
        ));
    };

    row.insert(
        "extraction_date".to_string(),
        Value::String(format_timestamp(&record.extraction_date)),
    );
    row.insert(
        PARTITION_COLUMN.to_string(),
        Value::String(format_timestamp(&record.job_run)),
    );

    if json == JsonEncoding::Text {
        for col in COLUMNS.iter().filter(|c| c.column_type == ColumnType::Json) {
            if let Some(value) = row.get_mut(col.name) {
                if !value.is_null() {
                    let text = serde_json::to_string(&*value)?;
                    *value = Value::String(text);
                }
            }
        }
    }

    Ok(row)
}

/// Serialize records as newline-delimited JSON
///
/// # Errors
///
/// Returns a serialization error if any record cannot be converted.
pub fn to_ndjson(records: &[CanonicalRecord]) -> Result<String> {
    let mut out = String::new();
    for record in records {
        let row = to_row(record, JsonEncoding::Text)?;
        out.push_str(&serde_json::to_string(&row)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AttributeValue, ProductId, SellerReputation};
    use chrono::TimeZone;

    fn sample() -> CanonicalRecord {
        let job_run = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        let mut record = CanonicalRecord::new(ProductId::new("MLA1").unwrap(), job_run);
        record.price = Some(1299.5);
        record.images = vec!["https://img/1.jpg".to_string()];
        record.attributes.insert(
            "BRAND".to_string(),
            AttributeValue {
                name: "Marca".to_string(),
                value: "Acme".to_string(),
            },
        );
        record
    }

    #[test]
    fn test_columns_match_serialized_record() {
        let row = to_row(&sample(), JsonEncoding::Native).unwrap();
        assert_eq!(row.len(), COLUMNS.len());
        for col in COLUMNS {
            assert!(row.contains_key(col.name), "missing column {}", col.name);
        }
    }

    #[test]
    fn test_timestamps_have_microseconds_and_z() {
        let row = to_row(&sample(), JsonEncoding::Native).unwrap();
        assert_eq!(row["JOB_RUN"], "2025-03-01T12:30:00.000000Z");
        assert_eq!(row["extraction_date"], "2025-03-01T12:30:00.000000Z");
    }

    #[test]
    fn test_json_columns_text_encoding() {
        let mut record = sample();
        record.seller_reputation = Some(SellerReputation {
            level_id: Some("5_green".to_string()),
            ..Default::default()
        });

        let row = to_row(&record, JsonEncoding::Text).unwrap();
        let attributes = row["attributes"].as_str().unwrap();
        let parsed: Value = serde_json::from_str(attributes).unwrap();
        assert_eq!(parsed["BRAND"]["value"], "Acme");
        assert!(row["seller_reputation"].is_string());

        let native = to_row(&record, JsonEncoding::Native).unwrap();
        assert!(native["attributes"].is_object());
    }

    #[test]
    fn test_null_json_column_stays_null() {
        let row = to_row(&sample(), JsonEncoding::Text).unwrap();
        assert!(row["seller_reputation"].is_null());
    }

    #[test]
    fn test_floats_stay_floats() {
        let row = to_row(&sample(), JsonEncoding::Text).unwrap();
        assert_eq!(row["price"].as_f64(), Some(1299.5));
        assert!(row["rating"].is_null());
    }

    #[test]
    fn test_ndjson_one_line_per_record() {
        let body = to_ndjson(&[sample(), sample()]).unwrap();
        assert_eq!(body.lines().count(), 2);
        assert!(body.ends_with('\n'));
        assert!(to_ndjson(&[]).unwrap().is_empty());
    }
}
