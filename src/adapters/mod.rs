//! External system integrations.
//!
//! This module provides adapters for the systems a run talks to:
//!
//! - [`source`] - Extraction source abstraction (trait + factory)
//! - [`meli`] - Marketplace public REST API
//! - [`apify`] - Scrape-job actor API
//! - [`warehouse`] - Sink abstraction and row serialization
//! - [`bigquery`] - BigQuery sink over the REST API
//! - [`postgresql`] - PostgreSQL sink
//! - [`http`] - Shared HTTP client, error mapping and retry
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with mock implementations. Sources and sinks sit behind
//! [`source::ExtractionSource`] and [`warehouse::RecordSink`], built by their
//! factories from configuration.
//!
//! ```rust,no_run
//! use meli_etl::adapters::source::create_source;
//! use meli_etl::config::PipelineConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = PipelineConfig::default();
//! config.meli.search_query = "notebook".to_string();
//!
//! let source = create_source(&config)?;
//! let records = source.extract().await?;
//! println!("{} raw records from {}", records.len(), source.name());
//! # Ok(())
//! # }
//! ```

pub mod apify;
pub mod bigquery;
pub mod http;
pub mod meli;
pub mod postgresql;
pub mod source;
pub mod warehouse;
