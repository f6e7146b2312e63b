//! Marketplace REST API models
//!
//! Only the envelope is typed. Listings stay as raw JSON objects so the
//! normalizer sees exactly what the upstream returned.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response of `GET /sites/{site_id}/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Listings on this page
    #[serde(default)]
    pub results: Vec<Value>,

    /// Paging information, when the upstream includes it
    #[serde(default)]
    pub paging: Option<Paging>,
}

/// Paging block of a search response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_deserialize() {
        let body = r#"{
            "site_id": "MLA",
            "paging": {"total": 1200, "offset": 0, "limit": 50, "primary_results": 1000},
            "results": [{"id": "MLA1", "title": "Phone"}]
        }"#;

        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.paging.unwrap().total, 1200);
    }

    #[test]
    fn test_search_response_without_results() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.results.is_empty());
        assert!(response.paging.is_none());
    }
}
