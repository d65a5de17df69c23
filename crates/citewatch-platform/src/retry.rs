//! Retry with exponential back-off and jitter for platform HTTP calls.
//!
//! [`retry_with_backoff`] wraps a fallible async operation and retries on
//! transient errors (network failures, 5xx). Rate-limit signals are never
//! retried here — outbound pacing is owned by the admission controller, and
//! hammering a provider that already said 429 only extends the penalty.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Internal error taxonomy of the HTTP adapter, prior to categorization
/// into a `QueryErrorKind`.
#[derive(Debug, Error)]
pub(crate) enum HttpError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(StatusCode),

    #[error("provider rate limit hit")]
    RateLimited,

    #[error("malformed response body: {0}")]
    Malformed(String),
}

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// **Retriable:** network-level failures (timeout, connection reset) and
/// HTTP 5xx. **Not retriable:** 4xx statuses, [`HttpError::RateLimited`],
/// and malformed bodies — retrying won't fix any of them.
pub(crate) fn is_retriable(err: &HttpError) -> bool {
    match err {
        HttpError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        HttpError::Status(status) => status.is_server_error(),
        HttpError::RateLimited | HttpError::Malformed(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors. Delay doubles per attempt from `backoff_base_ms`, with
/// ±25% jitter, capped at 30s. Non-retriable errors return immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, HttpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HttpError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient platform error — retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
