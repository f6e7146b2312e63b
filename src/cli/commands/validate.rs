//! Validate config command implementation
//!
//! This module implements the `validate-config` command: load the
//! configuration exactly as a run would and print a summary.

use crate::config::load_config;
use crate::config::schema::{PipelineConfig, SinkTarget, SourceKind};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        println!("Validating configuration file: {config_path}");
        println!();

        // Loading applies env substitution, overrides and validation
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(1);
            }
        };

        println!("Configuration is valid");
        println!();
        for line in summary(&config) {
            println!("  {line}");
        }
        println!();
        Ok(0)
    }
}

/// Human-readable summary lines, secrets excluded
fn summary(config: &PipelineConfig) -> Vec<String> {
    let mut lines = vec![
        format!("Log Level: {}", config.application.log_level),
        format!("Dry Run: {}", config.application.dry_run),
        format!("Source: {}", config.source.kind),
    ];

    match config.source.kind {
        SourceKind::Rest => {
            lines.push(format!("API: {}", config.meli.base_url));
            lines.push(format!("Site: {}", config.meli.site_id));
            lines.push(format!("Query: {}", config.meli.search_query));
            lines.push(format!("Max Products: {}", config.meli.max_products));
        }
        SourceKind::Scrape => {
            lines.push(format!("Actor: {}", config.apify.actor_id));
            lines.push(format!("Search: {}", config.apify.search));
            lines.push(format!("Max Items: {}", config.apify.max_item_count));
        }
    }

    lines.push(format!("Sink: {}", config.sink_target));
    match config.sink_target {
        SinkTarget::BigQuery => {
            if let Some(ref bq) = config.bigquery {
                lines.push(format!(
                    "Table: {}.{}.{}",
                    bq.project_id, bq.dataset_id, bq.table_id
                ));
                lines.push(format!("Clustering: {}", bq.clustering_fields.join(", ")));
            }
        }
        SinkTarget::PostgreSQL => {
            if let Some(ref pg) = config.postgresql {
                lines.push(format!("Table: {}.{}", pg.schema, pg.table));
                lines.push(format!("Max Connections: {}", pg.max_connections));
            }
        }
    }

    lines
}
