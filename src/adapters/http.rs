//! Shared HTTP plumbing for the REST adapters
//!
//! Client construction, status-to-error mapping and the exponential backoff
//! retry loop used by the extraction sources.

use crate::config::RetryConfig;
use crate::domain::{PipelineError, Result, SourceError};
use reqwest::{Client, ClientBuilder, StatusCode};
use std::future::Future;
use std::time::Duration;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("meli-etl/", env!("CARGO_PKG_VERSION"));

/// Builds an HTTP client with the given request timeout
///
/// # Errors
///
/// Returns a configuration error if the TLS backend cannot be initialized.
pub fn build_client(timeout_seconds: u64) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_seconds))
        .connect_timeout(Duration::from_secs(timeout_seconds.min(30)))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| PipelineError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// Maps a transport error to a source error
pub fn request_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Timeout(err.to_string())
    } else {
        SourceError::ConnectionFailed(err.to_string())
    }
}

/// Maps a non-success HTTP status to a source error
pub fn status_error(status: StatusCode, body: String) -> SourceError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SourceError::AuthenticationFailed(format!("{status}: {body}"))
        }
        StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimited(body),
        s if s.is_server_error() => SourceError::ServerError {
            status: s.as_u16(),
            message: body,
        },
        s => SourceError::ClientError {
            status: s.as_u16(),
            message: body,
        },
    }
}

/// Whether an error is worth retrying
pub fn is_retryable(err: &PipelineError) -> bool {
    match err {
        PipelineError::Source(e) => e.is_transient(),
        _ => false,
    }
}

/// Backoff delay before retry number `attempt` (1-based)
pub fn backoff_delay(retry: &RetryConfig, attempt: usize) -> Duration {
    let exponent = attempt.saturating_sub(1) as i32;
    let delay_ms = retry.initial_delay_ms as f64 * retry.backoff_multiplier.powi(exponent);
    let delay_ms = delay_ms.min(retry.max_delay_ms as f64) as u64;
    Duration::from_millis(delay_ms)
}

/// Retry a request with exponential backoff
///
/// Transient failures (connection errors, timeouts, 429, 5xx) are retried up
/// to `max_retries` times; anything else is returned immediately.
pub async fn retry_request<F, T, Fut>(retry: &RetryConfig, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempt += 1;
                if attempt > retry.max_retries || !is_retryable(&e) {
                    return Err(e);
                }

                let delay = backoff_delay(retry, attempt);
                crate::log_retry_attempt!(attempt, retry.max_retries, e);
                tracing::debug!(delay_ms = delay.as_millis() as u64, "Backing off");

                tokio::time::sleep(delay).await;
            }
        }
    }
}
