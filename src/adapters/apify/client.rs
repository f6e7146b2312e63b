//! Actor API client
//!
//! Implements [`ExtractionSource`] by starting an actor run, polling it until a
//! terminal status and paging through its default dataset.

use crate::adapters::apify::models::{ActorInput, ActorRun, RunEnvelope};
use crate::adapters::http::{build_client, request_error, retry_request, status_error};
use crate::adapters::source::ExtractionSource;
use crate::config::{ApifyConfig, SecretString};
use crate::domain::{PipelineError, RawRecord, Result, SourceError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// Name recorded in run metrics for this source
pub const SOURCE_NAME: &str = "apify";

/// Client for the scrape-job actor API
pub struct ApifyClient {
    config: ApifyConfig,
    client: Client,
    base_url: String,
    token: SecretString,
}

impl ApifyClient {
    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no token is configured or the HTTP
    /// client cannot be built.
    pub fn new(config: ApifyConfig) -> Result<Self> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.expose_secret().is_empty())
            .ok_or_else(|| {
                PipelineError::Configuration(
                    "apify.token is required for the scrape source (set APIFY_TOKEN)".to_string(),
                )
            })?;
        let client = build_client(config.timeout_seconds)?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            config,
            client,
            base_url,
            token,
        })
    }

    /// Actor id as used in URL paths (`user/actor` becomes `user~actor`)
    pub fn actor_path(&self) -> String {
        self.config.actor_id.replace('/', "~")
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", self.token.expose_secret().bearer())
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let resp = self
            .authorized(request)
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

    /// Start an actor run
    ///
    /// Not retried: a repeated start would launch a second job.
    pub async fn start_run(&self) -> Result<ActorRun> {
        let url = format!("{}/v2/acts/{}/runs", self.base_url, self.actor_path());
        let input = ActorInput::from(&self.config);

        tracing::info!(
            actor_id = %self.config.actor_id,
            search = %self.config.search,
            "Starting actor run"
        );

        let request = self
            .client
            .post(&url)
            .query(&[("waitForFinish", self.config.wait_seconds.to_string())])
            .json(&input);

        let envelope: RunEnvelope = self.send_json(request).await?;
        Ok(envelope.data)
    }

    /// Fetch the current state of a run, waiting server-side for completion
    pub async fn get_run(&self, run_id: &str) -> Result<ActorRun> {
        let url = format!("{}/v2/actor-runs/{}", self.base_url, run_id);
        let wait = self.config.wait_seconds.to_string();

        let envelope: RunEnvelope = retry_request(&self.config.retry, || {
            let request = self.client.get(&url).query(&[("waitForFinish", wait.as_str())]);
            self.send_json(request)
        })
        .await?;
        Ok(envelope.data)
    }

    /// Poll a run until it reaches a terminal status
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Timeout`] once `max_wait_seconds` elapse and
    /// [`SourceError::JobFailed`] for any terminal status other than
    /// `SUCCEEDED`.
    pub async fn wait_for_run(&self, mut run: ActorRun) -> Result<ActorRun> {
        let deadline = Instant::now() + Duration::from_secs(self.config.max_wait_seconds);

        while !run.is_terminal() {
            if Instant::now() >= deadline {
                return Err(SourceError::Timeout(format!(
                    "actor run {} still {} after {}s",
                    run.id, run.status, self.config.max_wait_seconds
                ))
                .into());
            }

            tracing::debug!(run_id = %run.id, status = %run.status, "Waiting for actor run");
            run = self.get_run(&run.id).await?;
        }

        if !run.succeeded() {
            return Err(SourceError::JobFailed {
                run_id: run.id,
                status: run.status,
            }
            .into());
        }

        tracing::info!(run_id = %run.id, "Actor run succeeded");
        Ok(run)
    }

    /// Read every item of a dataset, one page at a time
    pub async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<RawRecord>> {
        let url = format!("{}/v2/datasets/{}/items", self.base_url, dataset_id);
        let limit = self.config.dataset_page_size;
        let mut items: Vec<RawRecord> = Vec::new();

        loop {
            let query = [
                ("format", "json".to_string()),
                ("clean", "true".to_string()),
                ("offset", items.len().to_string()),
                ("limit", limit.to_string()),
            ];

            let page: Vec<RawRecord> = retry_request(&self.config.retry, || {
                self.send_json(self.client.get(&url).query(&query))
            })
            .await?;

            let page_len = page.len();
            items.extend(page);

            tracing::debug!(
                dataset_id = %dataset_id,
                page_size = page_len,
                total = items.len(),
                "Fetched dataset page"
            );

            if page_len < limit {
                break;
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl ExtractionSource for ApifyClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn extract(&self) -> Result<Vec<RawRecord>> {
        let run = self.start_run().await?;
        let run = self.wait_for_run(run).await?;

        let Some(dataset_id) = run.dataset_id() else {
            tracing::warn!(run_id = %run.id, "Actor run has no default dataset, no results");
            return Ok(Vec::new());
        };

        tracing::info!(dataset_id = %dataset_id, "Reading actor dataset");
        let items = self.dataset_items(dataset_id).await?;

        tracing::info!(count = items.len(), "Scrape-job extraction complete");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{secret_string, RetryConfig};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn test_config(base_url: &str) -> ApifyConfig {
        ApifyConfig {
            base_url: base_url.to_string(),
            token: Some(secret_string("tok".to_string())),
            search: "phone".to_string(),
            wait_seconds: 1,
            max_wait_seconds: 30,
            dataset_page_size: 2,
            retry: RetryConfig {
                max_retries: 1,
                initial_delay_ms: 1,
                max_delay_ms: 2,
                backoff_multiplier: 2.0,
            },
            ..Default::default()
        }
    }

    fn run_body(status: &str, dataset: Option<&str>) -> String {
        json!({"data": {"id": "run1", "status": status, "defaultDatasetId": dataset}}).to_string()
    }

    #[test]
    fn test_actor_path_replaces_slash() {
        let mut config = test_config("http://localhost");
        config.actor_id = "someone/mercado-scraper".to_string();

        let client = ApifyClient::new(config).unwrap();
        assert_eq!(client.actor_path(), "someone~mercado-scraper");
    }

    #[test]
    fn test_new_requires_token() {
        let mut config = test_config("http://localhost");
        config.token = Some(secret_string(String::new()));

        assert!(matches!(
            ApifyClient::new(config),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_runs_actor_and_pages_dataset() {
        let mut server = Server::new_async().await;

        let start = server
            .mock("POST", "/v2/acts/q0PB9Xd1hjynYAEhi/runs")
            .match_query(Matcher::UrlEncoded("waitForFinish".into(), "1".into()))
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::PartialJson(json!({
                "search": "phone",
                "domainCode": "AR",
                "proxy": {"apifyProxyGroups": ["RESIDENTIAL"]}
            })))
            .with_status(201)
            .with_body(run_body("RUNNING", None))
            .create_async()
            .await;
        let _poll = server
            .mock("GET", "/v2/actor-runs/run1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(run_body("SUCCEEDED", Some("ds1")))
            .create_async()
            .await;
        let _first = server
            .mock("GET", "/v2/datasets/ds1/items")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("offset".into(), "0".into()),
                Matcher::UrlEncoded("limit".into(), "2".into()),
                Matcher::UrlEncoded("clean".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body(json!([{"title": "A"}, {"title": "B"}]).to_string())
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/v2/datasets/ds1/items")
            .match_query(Matcher::UrlEncoded("offset".into(), "2".into()))
            .with_status(200)
            .with_body(json!([{"title": "C"}]).to_string())
            .create_async()
            .await;

        let client = ApifyClient::new(test_config(&server.url())).unwrap();
        let items = client.extract().await.unwrap();

        start.assert_async().await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[2]["title"], "C");
    }

    #[tokio::test]
    async fn test_extract_failed_run() {
        let mut server = Server::new_async().await;

        let _start = server
            .mock("POST", "/v2/acts/q0PB9Xd1hjynYAEhi/runs")
            .match_query(Matcher::Any)
            .with_status(201)
            .with_body(run_body("FAILED", Some("ds1")))
            .create_async()
            .await;

        let client = ApifyClient::new(test_config(&server.url())).unwrap();
        let err = client.extract().await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Source(SourceError::JobFailed { ref status, .. }) if status == "FAILED"
        ));
    }

    #[tokio::test]
    async fn test_extract_without_dataset_returns_empty() {
        let mut server = Server::new_async().await;

        let _start = server
            .mock("POST", "/v2/acts/q0PB9Xd1hjynYAEhi/runs")
            .match_query(Matcher::Any)
            .with_status(201)
            .with_body(run_body("SUCCEEDED", None))
            .create_async()
            .await;

        let client = ApifyClient::new(test_config(&server.url())).unwrap();
        let items = client.extract().await.unwrap();

        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_wait_for_run_times_out() {
        let mut server = Server::new_async().await;

        let _start = server
            .mock("POST", "/v2/acts/q0PB9Xd1hjynYAEhi/runs")
            .match_query(Matcher::Any)
            .with_status(201)
            .with_body(run_body("RUNNING", None))
            .create_async()
            .await;

        let mut config = test_config(&server.url());
        config.max_wait_seconds = 0;

        let client = ApifyClient::new(config).unwrap();
        let err = client.extract().await.unwrap_err();

        assert!(matches!(err, PipelineError::Source(SourceError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_start_run_rejected_token() {
        let mut server = Server::new_async().await;

        let start = server
            .mock("POST", "/v2/acts/q0PB9Xd1hjynYAEhi/runs")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error":{"type":"token-not-valid"}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = ApifyClient::new(test_config(&server.url())).unwrap();
        let err = client.extract().await.unwrap_err();

        start.assert_async().await;
        assert!(matches!(
            err,
            PipelineError::Source(SourceError::AuthenticationFailed(_))
        ));
    }
}
