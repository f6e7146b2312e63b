// Meli ETL - Marketplace listings to analytical warehouse pipeline
// Copyright (c) 2025 Meli ETL Contributors
// Licensed under the MIT License

//! # Meli ETL - marketplace listings to analytical warehouse
//!
//! Meli ETL pulls product listings from an online marketplace, normalizes them
//! into one canonical record shape and appends them to a date-partitioned
//! analytical table.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Extracting** listings from the marketplace REST API (search, item detail
//!   and seller profile) or from a scrape-job actor and its dataset
//! - **Transforming** either upstream shape into a [`domain::CanonicalRecord`]
//! - **Loading** records into BigQuery or PostgreSQL, partitioned by the run
//!   timestamp `JOB_RUN`
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (normalization, batch transform, run coordination)
//! - [`adapters`] - External integrations (marketplace API, scrape jobs, warehouses)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meli_etl::config::load_config;
//! use meli_etl::core::pipeline::PipelineCoordinator;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("config/pipeline.toml")?;
//!     let coordinator = PipelineCoordinator::from_config(config).await?;
//!
//!     let metrics = coordinator.run().await;
//!     println!("Loaded {} records", metrics.records_loaded);
//!     std::process::exit(metrics.exit_code());
//! }
//! ```
//!
//! ## Normalization
//!
//! Normalization is pure and deterministic for a given run timestamp:
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use meli_etl::core::transform::normalize;
//! use serde_json::json;
//!
//! let job_run = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
//! let raw = json!({"title": "Phone X", "price": "1.299,00", "url": "http://x/1"});
//!
//! let record = normalize(&raw, job_run).unwrap();
//! assert_eq!(record.price, Some(1299.0));
//! assert_eq!(record.job_run, job_run);
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::PipelineError`]; the binary wraps it with
//! `anyhow` at the command boundary.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
