//! Core business logic.
//!
//! # Modules
//!
//! - [`transform`] - Record normalization into the canonical listing shape
//! - [`pipeline`] - Batch transformation, run coordination and metrics
//!
//! # Run Workflow
//!
//! 1. **Extract**: The configured source returns raw listing records
//! 2. **Transform**: Each record is normalized; failures are dropped and logged
//! 3. **Ensure table**: The sink creates the partitioned table if needed
//! 4. **Append**: The batch is appended in one all-or-nothing operation
//! 5. **Report**: Run metrics are logged and printed
//!
//! # Example
//!
//! ```rust,no_run
//! use meli_etl::config::load_config;
//! use meli_etl::core::pipeline::PipelineCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("config/pipeline.toml")?;
//! let coordinator = PipelineCoordinator::from_config(config).await?;
//!
//! let metrics = coordinator.run().await;
//! println!("Loaded: {}", metrics.records_loaded);
//! std::process::exit(metrics.exit_code());
//! # }
//! ```

pub mod pipeline;
pub mod transform;
