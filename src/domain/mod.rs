//! Domain models and types for the listings pipeline.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ProductId`])
//! - **Record models** ([`RawRecord`], [`CanonicalRecord`])
//! - **Error types** ([`PipelineError`], [`SourceError`], [`SinkError`], [`TransformError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible pipeline operations return [`Result<T, PipelineError>`]:
//!
//! ```rust,no_run
//! use meli_etl::domain::Result;
//!
//! fn example() -> Result<()> {
//!     // Errors are automatically converted using the ? operator
//!     let config = meli_etl::config::load_config("config/pipeline.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{PipelineError, SinkError, SourceError, TransformError};
pub use ids::ProductId;
pub use record::{AttributeValue, CanonicalRecord, RawRecord, SellerReputation};
pub use result::Result;
