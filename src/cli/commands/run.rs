//! Run command implementation
//!
//! This module implements the `run` command: one extract, transform and load
//! pass, with the run metrics printed to stdout as JSON.

use crate::config::load_config;
use crate::core::pipeline::PipelineCoordinator;
use crate::logging::{init_console_logging, init_logging};
use clap::Args;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Dry run mode - extract and transform without creating tables or writing rows
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Execute the run command
    ///
    /// Returns the process exit code: 0 on success, 1 on any run-level
    /// failure including configuration errors.
    pub async fn execute(&self, config_path: &str, log_level: Option<&str>) -> anyhow::Result<i32> {
        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                let _guard = init_console_logging(log_level.unwrap_or("info"));
                tracing::error!(config_path = %config_path, error = %e, "Failed to load configuration");
                eprintln!("Error: {e}");
                return Ok(1);
            }
        };

        let level = log_level
            .map(str::to_string)
            .unwrap_or_else(|| config.application.log_level.clone());
        let _guard = init_logging(&level, &config.logging)?;

        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            config_path = %config_path,
            "Meli ETL - marketplace listings pipeline"
        );

        if self.dry_run {
            tracing::info!("Dry run enabled from CLI");
            config.application.dry_run = true;
        }

        let coordinator = match PipelineCoordinator::from_config(config).await {
            Ok(coordinator) => coordinator,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize pipeline");
                eprintln!("Error: {e}");
                return Ok(1);
            }
        };

        let metrics = coordinator.run().await;
        println!("{}", serde_json::to_string_pretty(&metrics)?);

        Ok(metrics.exit_code())
    }
}
