//! Bounded worker pool and fan-in over tokio channels.
//!
//! Generic helpers; nothing here knows about identities or requests.
//! Both functions spawn tasks and must be called from within a tokio runtime.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;

/// Merge several receivers into one. The output closes once every input has
/// closed. Ordering across inputs is unspecified; order within one input is kept.
pub fn fan_in<T>(inputs: Vec<mpsc::Receiver<T>>) -> mpsc::Receiver<T>
where
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel(inputs.len().max(1));

    for mut input in inputs {
        let tx = tx.clone();
        tokio::spawn(async move {
            while let Some(item) = input.recv().await {
                if tx.send(item).await.is_err() {
                    // Output dropped; stop draining.
                    break;
                }
            }
        });
    }

    rx
}

/// Apply `f` to every item of every input with at most `limit` calls in flight.
///
/// A permit is taken before a call starts and released after its result has
/// been handed to the output, so a slow consumer also throttles the pool.
/// `limit == 0` is treated as 1. The output closes when all inputs are closed
/// and all calls have finished.
pub fn worker_pool<T, U, F, Fut>(
    limit: usize,
    f: F,
    inputs: Vec<mpsc::Receiver<T>>,
) -> mpsc::Receiver<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = U> + Send + 'static,
{
    let limit = limit.max(1);
    let (tx, rx) = mpsc::channel(limit);
    let permits = Arc::new(Semaphore::new(limit));
    let f = Arc::new(f);
    let mut merged = fan_in(inputs);

    tokio::spawn(async move {
        let mut tasks = JoinSet::new();

        while let Some(item) = merged.recv().await {
            // The semaphore is never closed, so acquire only fails if that changes.
            let Ok(permit) = permits.clone().acquire_owned().await else {
                break;
            };

            let f = f.clone();
            let tx = tx.clone();
            tasks.spawn(async move {
                let out = f(item).await;
                let _ = tx.send(out).await;
                drop(permit);
            });

            // Reap finished tasks so the set does not grow with the input.
            while let Some(res) = tasks.try_join_next() {
                if let Err(err) = res {
                    tracing::warn!(error = %err, "worker task failed");
                }
            }
        }

        while let Some(res) = tasks.join_next().await {
            if let Err(err) = res {
                tracing::warn!(error = %err, "worker task failed");
            }
        }
    });

    rx
}
