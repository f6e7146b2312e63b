//! PostgreSQL adapter implementing the sink trait

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::warehouse::RecordSink;
use crate::domain::{CanonicalRecord, Result};
use async_trait::async_trait;

/// PostgreSQL implementation of [`RecordSink`]
///
/// This wraps the PostgreSQLClient; dry-run handling lives here so the client
/// only ever talks to the database.
pub struct PostgreSQLAdapter {
    client: PostgreSQLClient,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordSink for PostgreSQLAdapter {
    fn name(&self) -> &str {
        "postgresql"
    }

    fn table_ref(&self) -> String {
        self.client.table_ref()
    }

    async fn ensure_table(&self, dry_run: bool) -> Result<()> {
        if dry_run {
            tracing::info!(
                table = %self.client.table_ref(),
                "DRY RUN: Would ensure PostgreSQL table exists"
            );
            return Ok(());
        }

        tracing::debug!(
            connection = %self.client.connection_string_safe(),
            "Ensuring PostgreSQL table"
        );
        self.client.ensure_table().await
    }

    async fn append(&self, records: &[CanonicalRecord], dry_run: bool) -> Result<usize> {
        if records.is_empty() {
            tracing::info!("No records to load");
            return Ok(0);
        }

        // If dry-run, skip actual write and report the batch size
        if dry_run {
            tracing::info!(
                count = records.len(),
                table = %self.client.table_ref(),
                "DRY RUN: Would insert {} records into PostgreSQL",
                records.len()
            );
            return Ok(records.len());
        }

        let inserted = self.client.append(records).await?;

        tracing::info!(
            count = inserted,
            job_run = %records[0].job_run,
            table = %self.client.table_ref(),
            "Inserted records into PostgreSQL"
        );
        Ok(inserted as usize)
    }
}
