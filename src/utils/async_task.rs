use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::Error;
use crate::Result;

/// Re-runs a fallible async task with exponential backoff.
///
/// Retry is always explicit and opt-in: the engine only reaches this helper
/// when a step config carries a `retries` count. Errors rejected by
/// `should_retry` (and the last error once attempts are exhausted) are
/// returned immediately.
pub(crate) async fn task_with_backoff<F, T, P, R>(
    task: F,
    max_attempts: usize,
    delay_duration: Duration,
    should_retry: R,
) -> Result<P>
where
    F: Fn() -> T,                               // The type of the async function
    T: std::future::Future<Output = Result<P>>, // The future returned by the async function
    R: Fn(&Error) -> bool,
{
    let max_attempts = max_attempts.max(1);
    let mut delay = delay_duration; // Initial delay
    let mut attempt = 0;
    loop {
        attempt += 1;
        match task().await {
            Ok(r) => {
                return Ok(r); // Exit on success
            }
            Err(error) => {
                if attempt >= max_attempts || !should_retry(&error) {
                    warn!("task failed after {} attempt(s): {:?}", attempt, &error);
                    return Err(error);
                }
                warn!("attempt {} failed with error: {:?}", attempt, &error);
            }
        };

        sleep(delay).await;
        delay *= 2; // Exponential backoff (double the delay each time)
    }
}
