//! Product identifier derivation
//!
//! First match wins: the explicit upstream `id`, then a digest of the
//! listing URL, then a digest of title and seller.

use super::fields::json_type_name;
use crate::domain::{ProductId, TransformError};
use serde_json::{Map, Value};
use sha1::{Digest, Sha1};

/// Delimiter between title and seller in the content digest (ASCII unit separator)
pub const CONTENT_DELIMITER: char = '\u{1f}';

/// Derives the product id of a record
///
/// # Arguments
///
/// * `record` - The raw record object
/// * `url` - The resolved listing URL, if any
/// * `title` - The cleaned title
/// * `seller` - The cleaned seller name
///
/// # Errors
///
/// Returns an error if `id` is present with a type that cannot be an
/// identifier (object, array, boolean).
pub fn derive_product_id(
    record: &Map<String, Value>,
    url: Option<&str>,
    title: &str,
    seller: &str,
) -> Result<ProductId, TransformError> {
    if let Some(explicit) = explicit_id(record)? {
        return ProductId::new(explicit).map_err(TransformError::InvalidId);
    }

    let digest = match url.filter(|u| !u.trim().is_empty()) {
        Some(url) => sha1_hex(url),
        None => sha1_hex(&format!("{title}{CONTENT_DELIMITER}{seller}")),
    };
    ProductId::new(digest).map_err(TransformError::InvalidId)
}

/// SHA-1 hex digest of a string
///
/// # Examples
///
/// ```
/// use meli_etl::core::transform::identity::sha1_hex;
///
/// assert_eq!(sha1_hex("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
/// ```
pub fn sha1_hex(input: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}

fn explicit_id(record: &Map<String, Value>) -> Result<Option<String>, TransformError> {
    match record.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(TransformError::UnsupportedFieldType {
            field: "id".to_string(),
            found: json_type_name(other).to_string(),
        }),
    }
}
