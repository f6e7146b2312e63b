//! Pipeline coordinator - main orchestrator for a run
//!
//! Wires the extraction source, the batch transformer and the record sink,
//! assigns the run timestamp and collects [`RunMetrics`].

use crate::adapters::source::{create_source, ExtractionSource};
use crate::adapters::warehouse::{create_sink, RecordSink};
use crate::config::PipelineConfig;
use crate::core::pipeline::batch::{transform_batch_detailed, BatchResult};
use crate::core::pipeline::metrics::RunMetrics;
use crate::domain::{PipelineError, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Pipeline coordinator
pub struct PipelineCoordinator {
    config: PipelineConfig,
    source: Arc<dyn ExtractionSource + Send + Sync>,
    sink: Arc<dyn RecordSink + Send + Sync>,
    job_run: DateTime<Utc>,
}

impl PipelineCoordinator {
    /// Create a coordinator from already-built components
    ///
    /// The run timestamp is taken now and shared by every record of the run.
    pub fn new(
        config: PipelineConfig,
        source: Arc<dyn ExtractionSource + Send + Sync>,
        sink: Arc<dyn RecordSink + Send + Sync>,
    ) -> Self {
        Self {
            config,
            source,
            sink,
            job_run: Utc::now(),
        }
    }

    /// Create a coordinator with the source and sink named in the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if either component cannot be created.
    pub async fn from_config(config: PipelineConfig) -> Result<Self> {
        let source = create_source(&config)?;
        let sink = create_sink(&config).await?;
        Ok(Self::new(config, source, sink))
    }

    /// Run timestamp of this coordinator
    pub fn job_run(&self) -> DateTime<Utc> {
        self.job_run
    }

    /// Execute one run
    ///
    /// Never returns an error: run-level failures are recorded in the
    /// returned metrics with `success = false`.
    pub async fn run(&self) -> RunMetrics {
        let dry_run = self.config.application.dry_run;
        let mut metrics = RunMetrics::new(self.job_run, self.source.name(), dry_run);

        tracing::info!(
            job_run = %self.job_run.to_rfc3339(),
            source = %self.source.name(),
            sink = %self.sink.name(),
            table = %self.sink.table_ref(),
            dry_run = dry_run,
            "Starting pipeline run"
        );

        match self.execute(&mut metrics).await {
            Ok(()) => {
                metrics.success = true;
                tracing::info!(job_run = %self.job_run.to_rfc3339(), "Pipeline run succeeded");
            }
            Err(e) => {
                tracing::error!(error = %e, "Pipeline run failed");
                metrics.add_error(e.to_string());
            }
        }

        metrics.finish();
        metrics.log_metrics();
        metrics
    }

    async fn execute(&self, metrics: &mut RunMetrics) -> Result<()> {
        tracing::info!("Extracting records");
        let raw = self.source.extract().await?;
        metrics.records_extracted = raw.len();

        if raw.is_empty() {
            tracing::warn!("No records extracted");
            return Err(PipelineError::Validation(
                "No records extracted from source".to_string(),
            ));
        }
        tracing::info!(count = raw.len(), "Extracted records");

        let BatchResult {
            records,
            failed,
            errors,
        } = transform_batch_detailed(&raw, self.job_run);
        metrics.records_transformed = records.len();
        metrics.records_dropped = failed;
        for error in errors {
            metrics.add_error(error);
        }

        if records.is_empty() {
            return Err(PipelineError::Validation(format!(
                "All {} extracted records were dropped during transformation",
                raw.len()
            )));
        }

        let dry_run = self.config.application.dry_run;
        self.sink.ensure_table(dry_run).await?;
        metrics.records_loaded = self.sink.append(&records, dry_run).await?;

        Ok(())
    }
}
