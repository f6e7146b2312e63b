//! BigQuery REST client
//!
//! Talks to the tables and jobs endpoints with an OAuth access token.

use crate::adapters::bigquery::models::{Job, JobReference, LoadJob, Table, TableReference};
use crate::adapters::http::build_client;
use crate::config::{BigQueryConfig, SecretString};
use crate::domain::{PipelineError, Result, SinkError};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// BigQuery client for one destination table
pub struct BigQueryClient {
    client: Client,
    config: BigQueryConfig,
    base_url: String,
    token: SecretString,
}

impl BigQueryClient {
    /// Create a new BigQuery client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no access token is configured.
    pub fn new(config: BigQueryConfig) -> Result<Self> {
        let token = config
            .access_token
            .clone()
            .filter(|t| !t.expose_secret().is_empty())
            .ok_or_else(|| {
                PipelineError::Configuration(
                    "bigquery.access_token is required (set GOOGLE_OAUTH_ACCESS_TOKEN)"
                        .to_string(),
                )
            })?;
        let client = build_client(config.timeout_seconds)?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            config,
            base_url,
            token,
        })
    }

    /// Destination table reference
    pub fn table_reference(&self) -> TableReference {
        TableReference {
            project_id: self.config.project_id.clone(),
            dataset_id: self.config.dataset_id.clone(),
            table_id: self.config.table_id.clone(),
        }
    }

    /// `project.dataset.table`
    pub fn table_ref(&self) -> String {
        format!(
            "{}.{}.{}",
            self.config.project_id, self.config.dataset_id, self.config.table_id
        )
    }

    fn tables_url(&self) -> String {
        format!(
            "{}/bigquery/v2/projects/{}/datasets/{}/tables",
            self.base_url, self.config.project_id, self.config.dataset_id
        )
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .header("Authorization", self.token.expose_secret().bearer())
            .send()
            .await
            .map_err(|e| SinkError::ConnectionFailed(e.to_string()).into())
    }

    /// Check whether the destination table exists
    pub async fn table_exists(&self) -> Result<bool> {
        let url = format!("{}/{}", self.tables_url(), self.config.table_id);
        let resp = self.send(self.client.get(&url)).await?;

        match resp.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(self.failure(status, body, |message| SinkError::TableCreationFailed {
                    table: self.table_ref(),
                    message,
                }))
            }
        }
    }

    /// Create the destination table
    ///
    /// Returns `false` when the table already existed (409).
    pub async fn create_table(&self) -> Result<bool> {
        let table = Table::listings(self.table_reference(), &self.config.clustering_fields);
        let resp = self
            .send(self.client.post(self.tables_url()).json(&table))
            .await?;

        match resp.status() {
            s if s.is_success() => Ok(true),
            StatusCode::CONFLICT => Ok(false),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(self.failure(status, body, |message| SinkError::TableCreationFailed {
                    table: self.table_ref(),
                    message,
                }))
            }
        }
    }

    /// Start a load job appending newline-delimited JSON rows
    pub async fn insert_load_job(&self, ndjson: String) -> Result<Job> {
        let job_id = format!("meli_etl_{}", uuid::Uuid::new_v4().simple());
        let job = LoadJob::append(
            JobReference {
                project_id: self.config.project_id.clone(),
                job_id,
                location: self.config.location.clone(),
            },
            self.table_reference(),
        );

        let boundary = format!("meli_etl_{}", uuid::Uuid::new_v4().simple());
        let body = multipart_body(&boundary, &serde_json::to_string(&job)?, &ndjson);
        let url = format!(
            "{}/upload/bigquery/v2/projects/{}/jobs",
            self.base_url, self.config.project_id
        );

        let request = self
            .client
            .post(&url)
            .query(&[("uploadType", "multipart")])
            .header(
                "Content-Type",
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body);

        let resp = self.send(request).await?;
        self.parse(resp, SinkError::LoadFailed).await
    }

    /// Fetch the current state of a job
    pub async fn get_job(&self, reference: &JobReference) -> Result<Job> {
        let url = format!(
            "{}/bigquery/v2/projects/{}/jobs/{}",
            self.base_url, reference.project_id, reference.job_id
        );
        let mut request = self.client.get(&url);
        if let Some(location) = reference.location.as_ref().or(self.config.location.as_ref()) {
            request = request.query(&[("location", location)]);
        }

        let resp = self.send(request).await?;
        self.parse(resp, SinkError::LoadFailed).await
    }

    /// Poll a job until it is done
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::LoadTimeout`] when `job_timeout_seconds` elapse and
    /// [`SinkError::LoadFailed`] when the job finished with an error result.
    pub async fn wait_for_job(&self, mut job: Job) -> Result<Job> {
        let deadline = Instant::now() + Duration::from_secs(self.config.job_timeout_seconds);
        let interval = Duration::from_millis(self.config.job_poll_interval_ms);

        while !job.is_done() {
            if Instant::now() >= deadline {
                return Err(SinkError::LoadTimeout {
                    job_id: job.job_reference.job_id,
                    seconds: self.config.job_timeout_seconds,
                }
                .into());
            }

            tracing::debug!(
                job_id = %job.job_reference.job_id,
                state = %job.status.state,
                "Waiting for load job"
            );
            tokio::time::sleep(interval).await;
            job = self.get_job(&job.job_reference).await?;
        }

        if let Some(error) = &job.status.error_result {
            let details: Vec<String> = job.status.errors.iter().map(ToString::to_string).collect();
            return Err(SinkError::LoadFailed(format!(
                "job {} failed: {}{}",
                job.job_reference.job_id,
                error,
                if details.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", details.join("; "))
                }
            ))
            .into());
        }

        Ok(job)
    }

    async fn parse<T: DeserializeOwned>(
        &self,
        resp: Response,
        on_error: impl FnOnce(String) -> SinkError,
    ) -> Result<T> {
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(self.failure(status, body, on_error));
        }

        resp.json::<T>()
            .await
            .map_err(|e| SinkError::InvalidResponse(e.to_string()).into())
    }

    fn failure(
        &self,
        status: StatusCode,
        body: String,
        on_error: impl FnOnce(String) -> SinkError,
    ) -> PipelineError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                SinkError::AuthenticationFailed(format!("{status}: {body}")).into()
            }
            _ => on_error(format!("{status}: {body}")).into(),
        }
    }
}

/// Build a `multipart/related` body: JSON job metadata followed by the data
fn multipart_body(boundary: &str, metadata: &str, data: &str) -> String {
    format!(
        "--{boundary}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {metadata}\r\n\
         --{boundary}\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {data}\r\n\
         --{boundary}--\r\n"
    )
}
