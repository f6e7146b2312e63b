//! Record sink factory
//!
//! Builds the sink named by `sink_target`.

use crate::adapters::bigquery::{BigQueryAdapter, BigQueryClient};
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::adapters::warehouse::traits::RecordSink;
use crate::config::schema::{PipelineConfig, SinkTarget};
use crate::domain::{PipelineError, Result};
use std::sync::Arc;

/// Create a record sink based on the configuration
///
/// # Errors
///
/// Returns an error if the selected sink section is missing or the client
/// cannot be created.
pub async fn create_sink(config: &PipelineConfig) -> Result<Arc<dyn RecordSink + Send + Sync>> {
    match config.sink_target {
        SinkTarget::BigQuery => {
            let bq_config = config.bigquery.as_ref().ok_or_else(|| {
                PipelineError::Configuration(
                    "sink_target = 'bigquery' requires a [bigquery] section".to_string(),
                )
            })?;

            tracing::info!(
                project_id = %bq_config.project_id,
                dataset_id = %bq_config.dataset_id,
                table_id = %bq_config.table_id,
                "Creating BigQuery sink"
            );
            let client = BigQueryClient::new(bq_config.clone())?;
            let adapter = BigQueryAdapter::new(client);

            Ok(Arc::new(adapter) as Arc<dyn RecordSink + Send + Sync>)
        }
        SinkTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                PipelineError::Configuration(
                    "sink_target = 'postgresql' requires a [postgresql] section".to_string(),
                )
            })?;

            tracing::info!(
                schema = %pg_config.schema,
                table = %pg_config.table,
                "Creating PostgreSQL sink"
            );
            let client = PostgreSQLClient::new(pg_config.clone()).await?;
            let adapter = PostgreSQLAdapter::new(client);

            Ok(Arc::new(adapter) as Arc<dyn RecordSink + Send + Sync>)
        }
    }
}
