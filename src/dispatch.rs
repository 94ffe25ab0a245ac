//! Bounded task dispatch for one inlining pass
//!
//! The dispatcher is an explicit object constructed once per top-level
//! pass and threaded through every recursive descent, instead of
//! module-level shared state. Dropping it when the pass returns tears the
//! pool down; pending tasks run to completion on the runtime.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinHandle};

/// Bounded dispatcher shared by one top-level inlining pass and all of
/// its recursive descents.
///
/// Tasks spawn immediately; [`Dispatcher::reserve`] hands out the permits
/// that bound how many fetches are in flight at once. Permits are scoped
/// to network I/O only: a pass awaiting its nested documents holds no
/// permit a child needs.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    permits: Arc<Semaphore>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Submit one task, obtaining its future result.
    pub fn submit<F>(&self, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        tokio::spawn(task)
    }

    /// Acquire a fetch permit, released when the returned guard drops.
    pub async fn reserve(&self) -> OwnedSemaphorePermit {
        // acquire_owned fails only once the semaphore is closed, and this
        // dispatcher never closes it.
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .expect("BUG: dispatcher semaphore closed")
    }

    /// Await every submitted handle, preserving submission order.
    pub async fn await_all<T>(handles: Vec<JoinHandle<T>>) -> Vec<Result<T, JoinError>>
    where
        T: Send + 'static,
    {
        futures::future::join_all(handles).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn permits_bound_concurrent_work() {
        let dispatcher = Dispatcher::new(3);
        let live = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..9 {
            let dispatcher_handle = dispatcher.clone();
            let live = Arc::clone(&live);
            let peak = Arc::clone(&peak);
            handles.push(dispatcher.submit(async move {
                let _permit = dispatcher_handle.reserve().await;
                let now = live.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                live.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        let started = Instant::now();
        let results = Dispatcher::await_all(handles).await;
        let elapsed = started.elapsed();

        assert!(results.iter().all(Result::is_ok));
        assert!(
            peak.load(Ordering::SeqCst) <= 3,
            "more tasks ran at once than the pool allows"
        );
        // 9 tasks of 50ms through 3 permits is 3 batches (~150ms); serial
        // execution would take ~450ms.
        assert!(
            elapsed < Duration::from_millis(400),
            "tasks did not overlap: {elapsed:?}"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn single_permit_serializes_work() {
        let dispatcher = Dispatcher::new(1);
        let peak = Arc::new(AtomicUsize::new(0));
        let live = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let dispatcher_handle = dispatcher.clone();
            let live = Arc::clone(&live);
            let peak = Arc::clone(&peak);
            handles.push(dispatcher.submit(async move {
                let _permit = dispatcher_handle.reserve().await;
                let now = live.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                live.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        Dispatcher::await_all(handles).await;
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn await_all_preserves_submission_order() {
        let dispatcher = Dispatcher::new(4);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                dispatcher.submit(async move {
                    // Later submissions finish first.
                    tokio::time::sleep(Duration::from_millis(80 - i * 10)).await;
                    i
                })
            })
            .collect();

        let results: Vec<u64> = Dispatcher::await_all(handles)
            .await
            .into_iter()
            .map(|r| r.expect("task panicked"))
            .collect();
        assert_eq!(results, (0..8).collect::<Vec<_>>());
    }
}
