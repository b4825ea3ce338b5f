//! Retry loop: run a closure until success, cancellation, or policy says stop.

use super::classify;
use super::error::FetchError;
use super::policy::{RetryDecision, RetryPolicy};
use crate::control::CancelToken;

/// Runs `f` until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
/// `f` receives the 1-based attempt number. A cancelled token ends the loop
/// with the last error, also when it is set during the backoff sleep.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, cancel: &CancelToken, mut f: F) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(_) if cancel.is_cancelled() => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(attempt, ?kind, delay_ms = d.as_millis() as u64, "retrying after: {}", e);
                        if !cancel.sleep(d) {
                            return Err(e);
                        }
                        attempt += 1;
                    }
                }
            }
        }
    }
}
