//! Result type alias for the pipeline
//!
//! This module provides a convenient Result type alias that uses PipelineError
//! as the error type.

use super::errors::PipelineError;

/// Result type alias for pipeline operations
///
/// # Examples
///
/// ```
/// use meli_etl::domain::result::Result;
/// use meli_etl::domain::errors::PipelineError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(PipelineError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PipelineError>;
