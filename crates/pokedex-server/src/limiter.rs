//! Bounded admission for detail resolution.
//!
//! A counting gate with a fixed ceiling. Tokio's semaphore is fair, so
//! waiting tasks are admitted in the order they queued. There is no timeout:
//! a hung call holds its permit until it finishes.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Semaphore;

/// Shared admission gate. Clones share the same permits.
#[derive(Clone, Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    ceiling: usize,
}

impl ConcurrencyLimiter {
    pub fn new(ceiling: usize) -> Self {
        let ceiling = ceiling.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(ceiling)),
            ceiling,
        }
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Permits currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Run one future once a permit is free.
    pub async fn run<F, T>(&self, task: F) -> T
    where
        F: Future<Output = T>,
    {
        // The semaphore is never closed, so acquire only fails if that changes;
        // in that case run unbounded rather than drop the work.
        let _permit = self.semaphore.acquire().await.ok();
        task.await
    }

    /// Run every future under the ceiling and wait for all of them.
    ///
    /// Output order follows input order, not completion order. Each task's
    /// outcome is independent: the futures carry their own error handling.
    pub async fn run_all<I, F, T>(&self, tasks: I) -> Vec<T>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = T>,
    {
        join_all(tasks.into_iter().map(|task| self.run(task))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_never_exceeds_ceiling() {
        let limiter = ConcurrencyLimiter::new(3);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks = (0..12).map(|i| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                i
            }
        });

        let results = limiter.run_all(tasks).await;
        assert_eq!(results, (0..12).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(limiter.available(), 3);
    }

    #[tokio::test]
    async fn test_results_follow_submission_order() {
        let limiter = ConcurrencyLimiter::new(5);
        // Later tasks finish first
        let tasks = (0..5u64).map(|i| async move {
            tokio::time::sleep(Duration::from_millis(25 - i * 5)).await;
            i
        });
        assert_eq!(limiter.run_all(tasks).await, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_siblings() {
        let limiter = ConcurrencyLimiter::new(2);
        let tasks = (0..4).map(|i| async move {
            if i == 1 { Err(format!("task {i} failed")) } else { Ok(i) }
        });
        let results = limiter.run_all(tasks).await;
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
        assert!(results[1].is_err());
    }

    #[test]
    fn test_zero_ceiling_is_raised() {
        assert_eq!(ConcurrencyLimiter::new(0).ceiling(), 1);
    }
}
