//! Retry with exponential backoff
//!
//! Shared by the store connection path and the REST fallback client. The
//! delay doubles after every failed attempt, starting from the configured
//! initial delay; no sleep follows the final attempt.

use std::time::Duration;

use std::future::Future;
use thiserror::Error;

/// All attempts failed; carries the last error observed.
#[derive(Debug, Error)]
#[error("operation failed after {attempts} attempts: {source}")]
pub struct RetryExhausted<E>
where
    E: std::error::Error + 'static,
{
    pub attempts: u32,
    #[source]
    pub source: E,
}

/// Run `op` up to `max_attempts` times, sleeping between attempts.
///
/// The first retry waits `initial_delay`, and every subsequent retry doubles
/// the wait. Returns the first success, or [`RetryExhausted`] wrapping the
/// error from the final attempt.
///
/// At least one attempt always runs: a `max_attempts` of 0 is treated as 1,
/// and [`RetryExhausted::attempts`] reports the clamped count.
pub async fn with_backoff<T, E, F, Fut>(
    max_attempts: u32,
    initial_delay: Duration,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    E: std::error::Error + 'static,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut delay = initial_delay;

    for attempt in 1..max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::warn!(attempt, max_attempts, error = %err, "attempt failed, backing off");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
    }

    // Final attempt, no sleep after it.
    op().await.map_err(|source| RetryExhausted {
        attempts: max_attempts.max(1),
        source,
    })
}
