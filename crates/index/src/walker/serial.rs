//! Single-task walker.

use super::{JobHandler, JobQueue, JobWalker, SharedState, Spawner, WalkError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Processes the initial jobs and everything they spawn on the calling task.
/// The default mode: deterministic, no worker pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialWalker;

#[async_trait]
impl<J, S, E> JobWalker<J, S, E> for SerialWalker
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
        let spawner = Spawner {
            queue: queue.clone(),
        };
        let state = SharedState::new(state);

        while let Some(job) = queue.pop() {
            if cancel.is_cancelled() {
                return (state.into_inner(), Err(WalkError::Cancelled));
            }
            let outcome = handler.handle(job, &spawner, &state).await;
            queue.finish();
            if let Err(err) = outcome {
                return (state.into_inner(), Err(WalkError::Handler(err)));
            }
        }

        (state.into_inner(), Ok(()))
    }
}
