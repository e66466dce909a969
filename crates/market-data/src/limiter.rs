//! Bounded-concurrency limiter for upstream calls.
//!
//! Backed by a fair [`Semaphore`]: callers waiting for a slot are served in
//! arrival order. The slot is released when the operation's future completes,
//! whether it succeeded or failed.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;
use tokio::sync::Semaphore;

/// Default number of simultaneous upstream calls.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

#[derive(Clone, Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    max: usize,
}

impl ConcurrencyLimiter {
    pub fn new(max: usize) -> Self {
        let max = max.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max)),
            max,
        }
    }

    /// Number of operations currently running.
    pub fn in_flight(&self) -> usize {
        self.max - self.semaphore.available_permits()
    }

    /// Run `operation` once a slot is free.
    pub async fn schedule<F, T>(&self, operation: F) -> T
    where
        F: Future<Output = T>,
    {
        // Never closed, so acquire only fails in theory.
        let _permit = self.semaphore.acquire().await.ok();
        debug!("Limiter: {}/{} in flight", self.in_flight(), self.max);
        operation.await
    }
}

impl Default for ConcurrencyLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENCY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[tokio::test]
    async fn test_never_exceeds_max_concurrency() {
        let limiter = ConcurrencyLimiter::new(4);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));

        let tasks = (0..10).map(|_| {
            let limiter = limiter.clone();
            let running = running.clone();
            let peak = peak.clone();
            let completed = completed.clone();
            async move {
                limiter
                    .schedule(async {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                        completed.fetch_add(1, Ordering::SeqCst);
                    })
                    .await
            }
        });
        futures::future::join_all(tasks).await;

        assert!(peak.load(Ordering::SeqCst) <= 4);
        assert_eq!(peak.load(Ordering::SeqCst), 4);
        assert_eq!(completed.load(Ordering::SeqCst), 10);
        assert_eq!(limiter.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_queued_operations_start_in_arrival_order() {
        let limiter = ConcurrencyLimiter::new(1);
        let order = Arc::new(Mutex::new(Vec::new()));

        let tasks = (0..5).map(|i| {
            let limiter = limiter.clone();
            let order = order.clone();
            async move {
                limiter
                    .schedule(async {
                        order.lock().unwrap().push(i);
                        tokio::task::yield_now().await;
                    })
                    .await
            }
        });
        futures::future::join_all(tasks).await;

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_failure_releases_slot_for_siblings() {
        let limiter = ConcurrencyLimiter::new(1);

        let failed: Result<(), &str> = limiter.schedule(async { Err("boom") }).await;
        assert!(failed.is_err());

        let ok: Result<i32, &str> = limiter.schedule(async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));
        assert_eq!(limiter.in_flight(), 0);
    }
}
