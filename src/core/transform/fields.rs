//! Field-level coercions shared by both record shapes
//!
//! Every function here degrades malformed input to an empty/`None` value
//! instead of failing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Maximum number of characters kept in a text column
pub const MAX_TEXT_CHARS: usize = 500;

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

// `%z` also accepts offsets without a colon (`+0000`)
const OFFSET_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Normalizes a text field
///
/// Non-string scalars are stringified, null/absent becomes `""`. The result
/// is trimmed, every run of `\r`/`\n` becomes a single space and the text is
/// capped at [`MAX_TEXT_CHARS`] characters.
///
/// # Examples
///
/// ```
/// use meli_etl::core::transform::fields::clean_text;
/// use serde_json::json;
///
/// assert_eq!(clean_text(Some(&json!("  hi\nthere\r\n"))), "hi there");
/// assert_eq!(clean_text(None), "");
/// ```
pub fn clean_text(value: Option<&Value>) -> String {
    let raw = match value {
        None | Some(Value::Null) => return String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    let mut cleaned = String::with_capacity(raw.len());
    let mut in_break = false;
    for c in raw.trim().chars() {
        if c == '\r' || c == '\n' {
            if !in_break {
                cleaned.push(' ');
                in_break = true;
            }
        } else {
            cleaned.push(c);
            in_break = false;
        }
    }

    if cleaned.chars().count() > MAX_TEXT_CHARS {
        cleaned.chars().take(MAX_TEXT_CHARS).collect()
    } else {
        cleaned
    }
}

/// Parses a locale-formatted price string
///
/// Keeps only digits, `.` and `,`. More than one `.` means dots are thousands
/// separators. With exactly one `.` and at least one `,` the separator that
/// occurs last is the decimal one. Remaining commas become the decimal point.
///
/// # Examples
///
/// ```
/// use meli_etl::core::transform::fields::parse_price_text;
///
/// assert_eq!(parse_price_text("$ 1.645.944,69"), Some(1645944.69));
/// assert_eq!(parse_price_text("1,234.56"), Some(1234.56));
/// assert_eq!(parse_price_text("consultar"), None);
/// ```
pub fn parse_price_text(text: &str) -> Option<f64> {
    let mut digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if digits.is_empty() {
        return None;
    }

    let dots = digits.matches('.').count();
    let commas = digits.matches(',').count();

    if dots > 1 {
        digits.retain(|c| c != '.');
    } else if dots == 1 && commas >= 1 {
        let last_dot = digits.rfind('.');
        let last_comma = digits.rfind(',');
        if last_comma > last_dot {
            digits.retain(|c| c != '.');
        } else {
            digits.retain(|c| c != ',');
        }
    }

    digits
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Coerces a JSON value into a finite float
///
/// Numbers pass through, strings go through [`parse_price_text`].
pub fn parse_decimal(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_price_text(s),
        _ => None,
    }
}

/// Returns the original price text, verbatim
///
/// Numbers are rendered with their JSON representation. Empty text is `None`.
pub fn price_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerces a JSON value into an integer count
///
/// Strings drop `.` and `,` separators before parsing. Integral numbers pass
/// through; fractional numbers and anything else yield `None`.
///
/// # Examples
///
/// ```
/// use meli_etl::core::transform::fields::parse_int;
/// use serde_json::json;
///
/// assert_eq!(parse_int(Some(&json!("12.345"))), Some(12345));
/// assert_eq!(parse_int(None), None);
/// ```
pub fn parse_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| v as i64)
        }),
        Value::String(s) => {
            let stripped: String = s.chars().filter(|c| *c != '.' && *c != ',').collect();
            let stripped = stripped.trim();
            if stripped.is_empty() {
                None
            } else {
                stripped.parse().ok()
            }
        }
        _ => None,
    }
}

/// Reads a list of image URLs
///
/// A list keeps its string entries, a single non-empty string becomes a
/// one-element list, anything else is empty.
pub fn image_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Optional non-empty text, cleaned
pub fn optional_text(value: Option<&Value>) -> Option<String> {
    let text = clean_text(value);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Resolves the extraction timestamp of a record
///
/// RFC 3339 values (trailing `Z` included) and `+0000` style offsets are
/// converted to UTC, naive timestamps and plain dates are read as UTC.
/// Anything else falls back to the run timestamp.
pub fn resolve_timestamp(value: Option<&Value>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    let Some(Value::String(text)) = value else {
        return fallback;
    };
    let text = text.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return parsed.with_timezone(&Utc);
    }

    for format in OFFSET_TIMESTAMP_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(text, format) {
            return parsed.with_timezone(&Utc);
        }
    }

    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return naive.and_utc();
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(fallback)
}

/// Name of a JSON value's type, for error messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
