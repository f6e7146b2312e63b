//! Configuration management for the pipeline.
//!
//! # Overview
//!
//! Configuration files are TOML (default) or YAML (`.yaml`/`.yml`) with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for optional settings
//! - `MELI_ETL_<SECTION>_<KEY>` and legacy environment overrides
//! - Per-section validation of the selected source and sink
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use meli_etl::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("config/pipeline.toml")?;
//!
//! println!("Source: {}", config.source.kind);
//! println!("Search: {}", config.meli.search_query);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! sink_target = "bigquery"
//!
//! [source]
//! kind = "rest"
//!
//! [meli]
//! site_id = "MLA"
//! search_query = "iphone"
//!
//! [bigquery]
//! project_id = "${GCP_PROJECT_ID}"
//! dataset_id = "marketplace"
//! table_id = "products"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApifyConfig, ApplicationConfig, BigQueryConfig, LoggingConfig, MeliConfig, PipelineConfig,
    PostgreSQLConfig, RetryConfig, SinkTarget, SourceConfig, SourceKind,
};
pub use secret::{secret_string, SecretString, SecretValue};
