//! Fixed-pool parallel walker.

use super::{JobHandler, JobQueue, JobWalker, SharedState, Spawner, WalkError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Drains the work queue with a fixed pool of worker tasks.
///
/// Completion is reached when every worker is idle and the queue is empty
/// (tracked by the queue's outstanding-job count). The first handler error
/// cancels the pool's child token; in-flight handlers are dropped at their
/// next suspension point and remaining jobs are abandoned.
pub struct ParallelWalker {
    concurrency: usize,
}

impl ParallelWalker {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }
}

#[async_trait]
impl<J, S, E> JobWalker<J, S, E> for ParallelWalker
where
    J: Send + 'static,
    S: Clone + Send + 'static,
    E: Send + 'static,
{
    async fn walk(
        &self,
        cancel: CancellationToken,
        initial: Vec<J>,
        state: S,
        handler: Arc<dyn JobHandler<J, S, E>>,
    ) -> (S, Result<(), WalkError<E>>) {
        let queue = Arc::new(JobQueue::new());
        for job in initial {
            queue.push(job);
        }
        let shared = Arc::new(SharedState::new(state));
        let first_error: Arc<Mutex<Option<E>>> = Arc::new(Mutex::new(None));
        let pool_cancel = cancel.child_token();

        let mut workers = JoinSet::new();
        for _ in 0..self.concurrency {
            let queue = queue.clone();
            let shared = shared.clone();
            let handler = handler.clone();
            let first_error = first_error.clone();
            let pool_cancel = pool_cancel.clone();
            let spawner = Spawner {
                queue: queue.clone(),
            };

            workers.spawn(async move {
                loop {
                    if pool_cancel.is_cancelled() {
                        break;
                    }
                    // Enable the waiter before inspecting the queue: a bare
                    // `Notified` registers nothing until polled, so a notify
                    // landing between the checks below and the select would
                    // otherwise be lost and the worker would park forever.
                    let signal = queue.signal();
                    tokio::pin!(signal);
                    signal.as_mut().enable();

                    if let Some(job) = queue.pop() {
                        let outcome = tokio::select! {
                            _ = pool_cancel.cancelled() => {
                                queue.finish();
                                break;
                            }
                            outcome = handler.handle(job, &spawner, &shared) => outcome,
                        };
                        queue.finish();
                        if let Err(err) = outcome {
                            let mut slot = first_error
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner);
                            if slot.is_none() {
                                *slot = Some(err);
                            }
                            drop(slot);
                            pool_cancel.cancel();
                            break;
                        }
                        continue;
                    }

                    if queue.is_quiescent() {
                        queue.notify_all();
                        break;
                    }

                    tokio::select! {
                        _ = pool_cancel.cancelled() => break,
                        _ = &mut signal => {}
                    }
                }
            });
        }

        while workers.join_next().await.is_some() {}

        let error = first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let state = match Arc::try_unwrap(shared) {
            Ok(state) => state.into_inner(),
            Err(shared) => shared.access(),
        };

        match error {
            Some(err) => (state, Err(WalkError::Handler(err))),
            None if cancel.is_cancelled() => (state, Err(WalkError::Cancelled)),
            None => (state, Ok(())),
        }
    }
}
