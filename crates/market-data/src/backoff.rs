//! Retry with exponential backoff.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::{Classify, RetryClass};

/// Default number of attempts, the first call included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay; attempt `i` waits `base * 2^i` before the next try.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(300);

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay after the failed attempt with zero-based index `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

/// Invoke `op` until it succeeds, fails terminally, or attempts run out.
///
/// Errors classified [`RetryClass::Never`] are returned at once. Otherwise the
/// last error is returned after `policy.max_attempts` invocations. No delay
/// follows the final attempt.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if err.retry_class() == RetryClass::Never {
                    debug!("Not retrying terminal error: {}", err);
                    return Err(err);
                }
                if attempt + 1 >= policy.max_attempts {
                    warn!("Giving up after {} attempts: {}", attempt + 1, err);
                    return Err(err);
                }
                let delay = policy.delay_for(attempt);
                debug!(
                    "Attempt {} failed ({}), retrying in {:?}",
                    attempt + 1,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MarketDataError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn timeout() -> MarketDataError {
        MarketDataError::Timeout {
            provider: "TEST".to_string(),
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(300));
        assert_eq!(policy.delay_for(1), Duration::from_millis(600));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1200));
    }

    #[tokio::test]
    async fn test_fails_twice_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<&str, MarketDataError> = with_retry(&fast_policy(), || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(timeout())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_always_failing_gives_up_after_bound() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), MarketDataError> = with_retry(&fast_policy(), || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(timeout())
            }
        })
        .await;

        assert!(matches!(result, Err(MarketDataError::Timeout { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_terminal_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), MarketDataError> = with_retry(&fast_policy(), || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(MarketDataError::ClientError {
                    provider: "TEST".to_string(),
                    status: 404,
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_between_attempts() {
        let start = tokio::time::Instant::now();

        let _: Result<(), MarketDataError> =
            with_retry(&RetryPolicy::default(), || async { Err(timeout()) }).await;

        // 300ms + 600ms, nothing after the last attempt
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(900));
        assert!(elapsed < Duration::from_millis(2100));
    }
}
