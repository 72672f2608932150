//! Retry loop: run a fresh operation per attempt until success, stop, or exhaustion.

use super::policy::RetryPolicy;
use crate::error::DownloadError;
use std::future::Future;
use tokio::time::timeout;

/// Runs operations produced by `factory` until one succeeds.
///
/// Each cycle reports the 1-based attempt number, obtains a brand-new
/// operation from the factory, and races it against `attempt_timeout`; when
/// the timer wins the operation is dropped, which releases its transport and
/// storage handles. On failure the error observer fires, then the stop
/// predicate, cancellation, and the attempt ceiling decide whether another
/// cycle runs after the optional delay. Retries are strictly sequential.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy<'_>,
    mut factory: F,
) -> Result<T, DownloadError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DownloadError>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        if let Some(hook) = policy.on_attempt {
            hook(attempt);
        }

        let outcome = match timeout(policy.attempt_timeout, factory()).await {
            Ok(result) => result,
            Err(_) => Err(DownloadError::Timeout(policy.attempt_timeout)),
        };
        let error = match outcome {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };
        tracing::debug!(attempt, %error, "attempt failed");

        if let Some(hook) = policy.on_error {
            hook(&error, attempt);
        }

        let stop = policy.should_stop.map_or(false, |pred| pred(&error));
        let exhausted = policy.max_attempts != 0 && attempt >= policy.max_attempts;
        // A cancelled attempt is terminal no matter what the predicate says.
        if stop || exhausted || error.is_cancelled() {
            return Err(error);
        }

        if let Some(delay) = policy.delay {
            tokio::time::sleep(delay).await;
        }
    }
}
