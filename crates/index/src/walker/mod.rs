//! Bounded-concurrency work-queue executors.
//!
//! A walker accepts an initial job set, a per-job handler, and a shared state,
//! then drives the jobs (and everything they spawn) to quiescence. Two
//! interchangeable modes exist behind one trait: [`SerialWalker`] drains the
//! queue on the calling task, [`ParallelWalker`] maintains a fixed worker
//! pool. Deduplication is the handler's responsibility; the walker never
//! inspects job identity.

pub mod parallel;
pub mod serial;

pub use parallel::ParallelWalker;
pub use serial::SerialWalker;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Error returned by [`JobWalker::walk`].
#[derive(Debug, Error)]
pub enum WalkError<E> {
    /// The first handler error; remaining jobs were abandoned.
    #[error("handler error: {0}")]
    Handler(E),

    /// The caller's token was cancelled before the queue drained.
    #[error("walk cancelled")]
    Cancelled,
}

/// Shared state wrapper handed to every handler invocation.
///
/// All reads go through [`SharedState::access`] and all mutation through
/// [`SharedState::cmp_swap`]. In serial mode the mutex is simply uncontended.
pub struct SharedState<S> {
    inner: Mutex<S>,
}

impl<S> SharedState<S> {
    pub(crate) fn new(state: S) -> Self {
        Self {
            inner: Mutex::new(state),
        }
    }

    /// Atomically: if `predicate(current)`, apply `update(current)` and return
    /// true; otherwise return false without mutating.
    pub fn cmp_swap(
        &self,
        predicate: impl FnOnce(&S) -> bool,
        update: impl FnOnce(&mut S),
    ) -> bool {
        let mut guard = self.lock();
        if !predicate(&guard) {
            return false;
        }
        update(&mut guard);
        true
    }

    fn lock(&self) -> MutexGuard<'_, S> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn into_inner(self) -> S {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: Clone> SharedState<S> {
    /// A consistent read-only snapshot of the state.
    pub fn access(&self) -> S {
        self.lock().clone()
    }
}

/// Work queue shared between a walker and the spawners it hands out.
///
/// `outstanding` counts jobs pushed but not yet finished; it reaches zero only
/// at quiescence because a handler's spawns are pushed before its own finish.
pub(crate) struct JobQueue<J> {
    jobs: Mutex<VecDeque<J>>,
    outstanding: AtomicUsize,
    notify: Notify,
}

impl<J> JobQueue<J> {
    pub(crate) fn new() -> Self {
        Self {
            jobs: Mutex::new(VecDeque::new()),
            outstanding: AtomicUsize::new(0),
            notify: Notify::new(),
        }
    }

    pub(crate) fn push(&self, job: J) {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        self.lock_jobs().push_back(job);
        self.notify.notify_waiters();
    }

    pub(crate) fn pop(&self) -> Option<J> {
        self.lock_jobs().pop_front()
    }

    pub(crate) fn finish(&self) {
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.notify.notify_waiters();
        }
    }

    pub(crate) fn is_quiescent(&self) -> bool {
        self.outstanding.load(Ordering::Acquire) == 0
    }

    /// A wakeup future for queue activity. The waiter is only registered once
    /// the future is pinned and enabled (or first polled); callers must do
    /// that before re-checking the queue, or a notification arriving in
    /// between is lost.
    pub(crate) fn signal(&self) -> Notified<'_> {
        self.notify.notified()
    }

    pub(crate) fn notify_all(&self) {
        self.notify.notify_waiters();
    }

    fn lock_jobs(&self) -> MutexGuard<'_, VecDeque<J>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle for enqueueing follow-up jobs from inside a handler.
///
/// Spawning is non-blocking and never fails; jobs spawned after cancellation
/// are abandoned by the walker.
pub struct Spawner<J> {
    pub(crate) queue: Arc<JobQueue<J>>,
}

impl<J> Clone for Spawner<J> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<J> Spawner<J> {
    /// Enqueue a follow-up job.
    pub fn spawn(&self, job: J) {
        self.queue.push(job);
    }
}

/// Per-job handler invoked by a walker.
#[async_trait]
pub trait JobHandler<J, S, E>: Send + Sync
where
    J: Send + 'static,
    S: Send + 'static,
    E: Send + 'static,
{
    async fn handle(
        &self,
        job: J,
        spawner: &Spawner<J>,
        state: &SharedState<S>,
    ) -> Result<(), E>;
}

/// A work-queue executor generic over job, state, and error types.
///
/// Returns the (possibly partial) accumulated state alongside the outcome:
/// any handler error cancels outstanding work and is returned as the walk's
/// error.
#[async_trait]
pub trait JobWalker<J, S, E>: Send + Sync
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
    ) -> (S, Result<(), WalkError<E>>);
}
