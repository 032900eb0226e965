// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-lane queue for remote store writes.
//!
//! The remote store's transport misbehaves when requests overlap on one
//! connection, so every remote write goes through an [`OperationQueue`]:
//! operations run one at a time in submission order with a fixed pause
//! between them. A failing or panicking operation does not stop the lane.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::time::Duration;

use draftloom_core::DraftloomError;
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Serializes remote operations onto one worker task.
pub struct OperationQueue {
    tx: mpsc::UnboundedSender<Job>,
    spacing: Duration,
}

impl OperationQueue {
    /// Start the worker lane. Must be called from within a Tokio runtime.
    pub fn new(spacing: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                job.await;
                if !spacing.is_zero() {
                    tokio::time::sleep(spacing).await;
                }
            }
            debug!("operation queue drained and closed");
        });
        Self { tx, spacing }
    }

    /// Pause inserted after each operation.
    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Submit `op` and return a future resolving to its output.
    ///
    /// Submission happens when `enqueue` is called, not when the returned
    /// future is first polled, so call order is execution order. Dropping the
    /// returned future does not cancel the operation.
    pub fn enqueue<F, Fut, T>(
        &self,
        op: F,
    ) -> impl Future<Output = Result<T, DraftloomError>> + Send + 'static
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, DraftloomError>> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let outcome = match AssertUnwindSafe(async move { op().await })
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(_) => {
                    error!("queued operation panicked");
                    Err(DraftloomError::Internal(
                        "queued operation panicked".to_string(),
                    ))
                }
            };
            // The submitter may have gone away; the outcome is then discarded.
            let _ = done_tx.send(outcome);
        });
        let submitted = self.tx.send(job).is_ok();

        async move {
            if !submitted {
                return Err(DraftloomError::Internal(
                    "operation queue is closed".to_string(),
                ));
            }
            done_rx.await.unwrap_or_else(|_| {
                Err(DraftloomError::Internal(
                    "operation queue worker stopped".to_string(),
                ))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn operations_run_one_at_a_time_in_submission_order() {
        let queue = OperationQueue::new(Duration::from_millis(10));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let order = Arc::new(Mutex::new(Vec::new()));

        let futures: Vec<_> = (0..5)
            .map(|i| {
                let in_flight = Arc::clone(&in_flight);
                let order = Arc::clone(&order);
                queue.enqueue(move || async move {
                    assert_eq!(in_flight.fetch_add(1, Ordering::SeqCst), 0);
                    // Later submissions finish faster if they were allowed to overlap.
                    tokio::time::sleep(Duration::from_millis(50 - i * 10)).await;
                    order.lock().unwrap().push(i);
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(i)
                })
            })
            .collect();

        let results = futures::future::join_all(futures).await;
        let values: Vec<u64> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_operations_are_spaced() {
        let queue = OperationQueue::new(Duration::from_millis(10));
        let first = queue.enqueue(|| async { Ok(tokio::time::Instant::now()) });
        let second = queue.enqueue(|| async { Ok(tokio::time::Instant::now()) });

        let (a, b) = tokio::join!(first, second);
        assert!(b.unwrap() - a.unwrap() >= Duration::from_millis(10));
    }

    #[tokio::test]
    async fn failure_does_not_halt_the_lane() {
        let queue = OperationQueue::new(Duration::ZERO);

        let failed: Result<(), _> = queue
            .enqueue(|| async { Err(DraftloomError::Internal("boom".into())) })
            .await;
        assert!(failed.is_err());

        let ok = queue.enqueue(|| async { Ok("next") }).await;
        assert_eq!(ok.unwrap(), "next");
    }

    #[tokio::test]
    async fn panic_is_reported_and_lane_survives() {
        let queue = OperationQueue::new(Duration::ZERO);

        async fn explode() -> Result<(), DraftloomError> {
            panic!("operation blew up")
        }

        let panicked = queue.enqueue(explode).await;
        assert!(matches!(panicked, Err(DraftloomError::Internal(_))));

        let ok = queue.enqueue(|| async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);
    }

    #[tokio::test]
    async fn abandoned_operation_still_runs() {
        let queue = OperationQueue::new(Duration::ZERO);
        let ran = Arc::new(AtomicUsize::new(0));

        let ran_clone = Arc::clone(&ran);
        drop(queue.enqueue(move || async move {
            ran_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        // Anything behind it in the lane completes only after it.
        queue.enqueue(|| async { Ok(()) }).await.unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
