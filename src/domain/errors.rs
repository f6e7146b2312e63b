//! Domain error types
//!
//! This module defines the error hierarchy for the pipeline. Adapter errors
//! never leak third-party types (HTTP client, database driver); they are
//! rendered into the domain variants below.

use thiserror::Error;

/// Main pipeline error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Extraction source errors (marketplace API, actor API)
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Sink errors (BigQuery, PostgreSQL)
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// Record transformation errors
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Extraction source errors
///
/// Errors that occur when talking to the marketplace REST API or the
/// actor-execution API.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to reach the upstream service
    #[error("Failed to connect to upstream: {0}")]
    ConnectionFailed(String),

    /// Upstream rejected the credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Invalid response from upstream: {0}")]
    InvalidResponse(String),

    /// Request or job polling timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Scrape job finished in a non-successful state
    #[error("Scrape job {run_id} finished with status {status}")]
    JobFailed { run_id: String, status: String },
}

impl SourceError {
    /// Whether a retry of the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SourceError::ConnectionFailed(_)
                | SourceError::RateLimited(_)
                | SourceError::ServerError { .. }
                | SourceError::Timeout(_)
        )
    }
}

/// Sink errors
///
/// Errors that occur when creating the destination table or appending rows.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Failed to connect to the warehouse
    #[error("Failed to connect to sink: {0}")]
    ConnectionFailed(String),

    /// Warehouse rejected the credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Table lookup or creation failed
    #[error("Failed to create table {table}: {message}")]
    TableCreationFailed { table: String, message: String },

    /// Load job or insert statement failed
    #[error("Load failed: {0}")]
    LoadFailed(String),

    /// Load job did not finish in time
    #[error("Load job {job_id} did not complete within {seconds}s")]
    LoadTimeout { job_id: String, seconds: u64 },

    /// Response body did not have the expected shape
    #[error("Invalid response from sink: {0}")]
    InvalidResponse(String),

    /// Statement execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

/// Per-record transformation errors
///
/// Raised only for structural problems that make a record unusable; field
/// level problems degrade to defaults instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    /// The raw record is not a JSON object
    #[error("Record is not an object (found {0})")]
    NotAnObject(String),

    /// A field has a type that cannot be coerced
    #[error("Field '{field}' has unsupported type {found}")]
    UnsupportedFieldType { field: String, found: String },

    /// No usable product identifier could be derived
    #[error("Invalid product identifier: {0}")]
    InvalidId(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PipelineError {
    fn from(err: toml::de::Error) -> Self {
        PipelineError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from yaml parse errors
impl From<serde_yaml::Error> for PipelineError {
    fn from(err: serde_yaml::Error) -> Self {
        PipelineError::Configuration(format!("YAML parse error: {err}"))
    }
}
