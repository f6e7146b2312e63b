//! BigQuery adapter implementing the sink trait

use crate::adapters::bigquery::client::BigQueryClient;
use crate::adapters::warehouse::row::to_ndjson;
use crate::adapters::warehouse::RecordSink;
use crate::domain::{CanonicalRecord, Result};
use async_trait::async_trait;

/// BigQuery implementation of [`RecordSink`]
pub struct BigQueryAdapter {
    client: BigQueryClient,
}

impl BigQueryAdapter {
    pub fn new(client: BigQueryClient) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &BigQueryClient {
        &self.client
    }
}

#[async_trait]
impl RecordSink for BigQueryAdapter {
    fn name(&self) -> &str {
        "bigquery"
    }

    fn table_ref(&self) -> String {
        self.client.table_ref()
    }

    async fn ensure_table(&self, dry_run: bool) -> Result<()> {
        let table = self.client.table_ref();

        if dry_run {
            tracing::info!(table = %table, "DRY RUN: Would ensure BigQuery table exists");
            return Ok(());
        }

        if self.client.table_exists().await? {
            tracing::info!(table = %table, "BigQuery table already exists");
            return Ok(());
        }

        if self.client.create_table().await? {
            tracing::info!(table = %table, "Created BigQuery table partitioned by JOB_RUN");
        } else {
            tracing::info!(table = %table, "BigQuery table was created concurrently");
        }
        Ok(())
    }

    async fn append(&self, records: &[CanonicalRecord], dry_run: bool) -> Result<usize> {
        if records.is_empty() {
            tracing::info!("No records to load");
            return Ok(0);
        }

        if dry_run {
            tracing::info!(
                count = records.len(),
                table = %self.client.table_ref(),
                "DRY RUN: Would load {} records into BigQuery",
                records.len()
            );
            return Ok(records.len());
        }

        let body = to_ndjson(records)?;
        let job = self.client.insert_load_job(body).await?;
        tracing::debug!(job_id = %job.job_reference.job_id, "Load job submitted");

        let job = self.client.wait_for_job(job).await?;

        tracing::info!(
            count = records.len(),
            job_id = %job.job_reference.job_id,
            job_run = %records[0].job_run,
            table = %self.client.table_ref(),
            "Loaded records into BigQuery"
        );
        Ok(records.len())
    }
}
