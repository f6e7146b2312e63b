//! Marketplace REST API client
//!
//! Implements [`ExtractionSource`] over `GET /sites/{site_id}/search`,
//! `GET /items/{id}` and `GET /users/{seller_id}`.

use crate::adapters::http::{build_client, request_error, retry_request, status_error};
use crate::adapters::meli::models::SearchResponse;
use crate::adapters::source::ExtractionSource;
use crate::config::MeliConfig;
use crate::domain::{RawRecord, Result, SourceError};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Name recorded in run metrics for this source
pub const SOURCE_NAME: &str = "meli_api";

/// Client for the marketplace public API
pub struct MeliClient {
    config: MeliConfig,
    client: Client,
    base_url: String,
}

impl MeliClient {
    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: MeliConfig) -> Result<Self> {
        let client = build_client(config.timeout_seconds)?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(request_error)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, body).into());
        }

        resp.json::<T>()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()).into())
    }

    /// Fetch one search page, retrying transient failures
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted, or immediately for
    /// non-transient failures.
    pub async fn search_page(&self, offset: usize) -> Result<SearchResponse> {
        let url = format!("{}/sites/{}/search", self.base_url, self.config.site_id);
        let query = [
            ("q", self.config.search_query.clone()),
            ("limit", self.config.limit_per_page.to_string()),
            ("offset", offset.to_string()),
        ];

        tracing::debug!(url = %url, offset = offset, "Fetching search page");

        retry_request(&self.config.retry, || self.get_json(&url, &query)).await
    }

    /// Fetch a JSON object for enrichment, degrading to an empty object
    async fn lookup(&self, kind: &str, url: String) -> Map<String, Value> {
        match self.get_json::<Value>(&url, &[]).await {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                tracing::warn!(
                    kind = kind,
                    url = %url,
                    found = %crate::core::transform::fields::json_type_name(&other),
                    "Enrichment lookup returned a non-object body"
                );
                Map::new()
            }
            Err(e) => {
                tracing::warn!(kind = kind, url = %url, error = %e, "Enrichment lookup failed");
                Map::new()
            }
        }
    }

    async fn item_details(&self, id: &str) -> Map<String, Value> {
        self.lookup("item", format!("{}/items/{}", self.base_url, id))
            .await
    }

    async fn seller_info(&self, seller_id: Option<&Value>) -> Map<String, Value> {
        match seller_id.and_then(id_segment) {
            Some(id) => {
                self.lookup("seller", format!("{}/users/{}", self.base_url, id))
                    .await
            }
            None => Map::new(),
        }
    }

    /// Enrich one base search result
    ///
    /// Base records without a usable `id` are passed through with only an
    /// `extraction_date` stamped.
    pub async fn enrich(&self, base: Value) -> Value {
        let mut base = match base {
            Value::Object(map) => map,
            other => return other,
        };

        let Some(id) = base.get("id").and_then(id_segment) else {
            tracing::warn!("Search result without id, passing through unenriched");
            base.insert("extraction_date".to_string(), Value::String(extraction_stamp()));
            return Value::Object(base);
        };

        let seller = base.get("seller").cloned().unwrap_or(Value::Null);
        let details = self.item_details(&id).await;
        let seller_info = self.seller_info(seller.get("id")).await;

        json!({
            "id": field(&base, "id"),
            "title": field(&base, "title"),
            "price": field(&base, "price"),
            "currency_id": field(&base, "currency_id"),
            "condition": field(&base, "condition"),
            "thumbnail": field(&base, "thumbnail"),
            "permalink": field(&base, "permalink"),
            "category_id": field(&base, "category_id"),
            "seller_id": seller.get("id").cloned().unwrap_or(Value::Null),
            "seller_nickname": seller.get("nickname").cloned().unwrap_or(Value::Null),
            "seller": seller,
            "address": base.get("address").cloned().unwrap_or_else(|| json!({})),
            "attributes": details.get("attributes").cloned().unwrap_or_else(|| json!([])),
            "pictures": details.get("pictures").cloned().unwrap_or_else(|| json!([])),
            "warranty": field(&details, "warranty"),
            "seller_info": Value::Object(seller_info),
            "extraction_date": extraction_stamp(),
        })
    }
}

#[async_trait]
impl ExtractionSource for MeliClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn extract(&self) -> Result<Vec<RawRecord>> {
        let cap = self.config.max_products;
        let delay = Duration::from_millis(self.config.request_delay_ms);
        let mut products: Vec<RawRecord> = Vec::new();
        let mut offset = 0;

        tracing::info!(
            site_id = %self.config.site_id,
            query = %self.config.search_query,
            max_products = cap,
            "Starting marketplace search"
        );

        while products.len() < cap {
            if offset > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let page = self.search_page(offset).await?;
            if page.results.is_empty() {
                tracing::debug!(offset = offset, "Empty search page, stopping pagination");
                break;
            }

            let page_len = page.results.len();
            for base in page.results {
                products.push(self.enrich(base).await);
            }

            tracing::info!(
                offset = offset,
                page_size = page_len,
                total = products.len(),
                "Fetched search page"
            );

            offset += self.config.limit_per_page;
        }

        products.truncate(cap);

        tracing::info!(count = products.len(), "Marketplace extraction complete");
        Ok(products)
    }
}

/// Current time as an RFC 3339 UTC string with microseconds
fn extraction_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn field(map: &Map<String, Value>, key: &str) -> Value {
    map.get(key).cloned().unwrap_or(Value::Null)
}

/// Path segment for an id given as a string or a number
fn id_segment(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use mockito::{Matcher, Server};

    fn test_config(base_url: &str) -> MeliConfig {
        MeliConfig {
            base_url: base_url.to_string(),
            search_query: "phone".to_string(),
            limit_per_page: 2,
            max_products: 3,
            request_delay_ms: 0,
            retry: RetryConfig {
                max_retries: 1,
                initial_delay_ms: 1,
                max_delay_ms: 2,
                backoff_multiplier: 2.0,
            },
            ..Default::default()
        }
    }

    fn page_query(offset: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "phone".into()),
            Matcher::UrlEncoded("limit".into(), "2".into()),
            Matcher::UrlEncoded("offset".into(), offset.into()),
        ])
    }

    #[test]
    fn test_id_segment() {
        assert_eq!(id_segment(&json!("MLA1")), Some("MLA1".to_string()));
        assert_eq!(id_segment(&json!(99)), Some("99".to_string()));
        assert_eq!(id_segment(&json!("  ")), None);
        assert_eq!(id_segment(&Value::Null), None);
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = MeliClient::new(test_config("http://localhost:1234/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234");
        assert_eq!(client.name(), "meli_api");
    }

    #[tokio::test]
    async fn test_extract_paginates_enriches_and_caps() {
        let mut server = Server::new_async().await;

        let _page0 = server
            .mock("GET", "/sites/MLA/search")
            .match_query(page_query("0"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"results": [
                    {"id": "MLA1", "title": "Phone A", "price": 100, "currency_id": "ARS",
                     "seller": {"id": 99, "nickname": "SHOP"}},
                    {"id": "MLA2", "title": "Phone B", "price": 200, "currency_id": "ARS"}
                ]})
                .to_string(),
            )
            .create_async()
            .await;
        let _page1 = server
            .mock("GET", "/sites/MLA/search")
            .match_query(page_query("2"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"results": [
                    {"id": "MLA3", "title": "Phone C"},
                    {"id": "MLA4", "title": "Phone D"}
                ]})
                .to_string(),
            )
            .create_async()
            .await;
        let _item = server
            .mock("GET", "/items/MLA1")
            .with_status(200)
            .with_body(
                json!({"warranty": "12 meses", "pictures": [{"secure_url": "https://img/1.jpg"}]})
                    .to_string(),
            )
            .create_async()
            .await;
        let _user = server
            .mock("GET", "/users/99")
            .with_status(200)
            .with_body(json!({"seller_reputation": {"level_id": "5_green"}}).to_string())
            .create_async()
            .await;

        let client = MeliClient::new(test_config(&server.url())).unwrap();
        let records = client.extract().await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["id"], "MLA1");
        assert_eq!(records[0]["warranty"], "12 meses");
        assert_eq!(records[0]["seller_nickname"], "SHOP");
        assert_eq!(records[0]["seller_info"]["seller_reputation"]["level_id"], "5_green");
        assert!(records[0]["extraction_date"].is_string());

        // Item lookup for MLA2 is not mocked and degrades to empty details
        assert_eq!(records[1]["pictures"], json!([]));
        assert_eq!(records[1]["seller_info"], json!({}));
        assert_eq!(records[2]["id"], "MLA3");
    }

    #[tokio::test]
    async fn test_extract_stops_on_empty_page() {
        let mut server = Server::new_async().await;

        let _page0 = server
            .mock("GET", "/sites/MLA/search")
            .match_query(page_query("0"))
            .with_status(200)
            .with_body(json!({"results": [{"title": "no id"}]}).to_string())
            .create_async()
            .await;
        let _page1 = server
            .mock("GET", "/sites/MLA/search")
            .match_query(page_query("2"))
            .with_status(200)
            .with_body(json!({"results": []}).to_string())
            .create_async()
            .await;

        let client = MeliClient::new(test_config(&server.url())).unwrap();
        let records = client.extract().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["title"], "no id");
        assert!(records[0]["extraction_date"].is_string());
        assert!(records[0].get("seller_info").is_none());
    }

    #[tokio::test]
    async fn test_extract_fails_after_retries() {
        let mut server = Server::new_async().await;

        let page = server
            .mock("GET", "/sites/MLA/search")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .expect(2)
            .create_async()
            .await;

        let client = MeliClient::new(test_config(&server.url())).unwrap();
        let result = client.extract().await;

        assert!(result.is_err());
        page.assert_async().await;
    }

    #[tokio::test]
    async fn test_extract_does_not_retry_client_errors() {
        let mut server = Server::new_async().await;

        let page = server
            .mock("GET", "/sites/MLA/search")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body("bad query")
            .expect(1)
            .create_async()
            .await;

        let client = MeliClient::new(test_config(&server.url())).unwrap();
        let err = client.extract().await.unwrap_err();

        assert!(err.to_string().contains("400"));
        page.assert_async().await;
    }
}
