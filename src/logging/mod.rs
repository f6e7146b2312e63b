//! Logging and observability
//!
//! This module installs the `tracing` subscriber for the binary. Library code
//! only emits events; it never configures logging.
//!
//! # Example
//!
//! ```no_run
//! use meli_etl::logging::init_logging;
//! use meli_etl::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(source = "rest", "Pipeline started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_console_logging, init_logging, LoggingGuard};

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use meli_etl::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying request"
        );
    };
}
