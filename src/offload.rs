//! Opt-in worker-queue dispatch.
//!
//! Handlers normally run synchronously on the engine's dispatch thread,
//! which a slow handler stalls. Wrapping a handler through an
//! [`OffloadQueue`] makes the connected closure merely enqueue the
//! decoded arguments; a dedicated worker thread drains the queue in
//! order. This is an explicit opt-in, not the default.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Sender, unbounded};
use tracing::debug;

type Job = Box<dyn FnOnce() + Send>;

/// A single worker thread fed by cloned wrapper closures.
///
/// The worker exits once the queue and every wrapper created from it
/// have been dropped.
pub struct OffloadQueue {
    jobs: Sender<Job>,
}

impl OffloadQueue {
    pub fn new() -> Self {
        let (jobs, queue) = unbounded::<Job>();
        thread::spawn(move || {
            while let Ok(job) = queue.recv() {
                job();
            }
            debug!("offload worker drained, exiting");
        });
        Self { jobs }
    }

    /// Wrap a parameterless handler.
    pub fn wrap0(&self, handler: impl Fn() + Send + Sync + 'static) -> impl Fn() + Send + Sync + 'static {
        let jobs = self.jobs.clone();
        let handler = Arc::new(handler);
        move || {
            let handler = Arc::clone(&handler);
            let _ = jobs.send(Box::new(move || handler()));
        }
    }

    /// Wrap a one-parameter handler.
    pub fn wrap1<A>(
        &self,
        handler: impl Fn(A) + Send + Sync + 'static,
    ) -> impl Fn(A) + Send + Sync + 'static
    where
        A: Send + 'static,
    {
        let jobs = self.jobs.clone();
        let handler = Arc::new(handler);
        move |a: A| {
            let handler = Arc::clone(&handler);
            let _ = jobs.send(Box::new(move || handler(a)));
        }
    }

    /// Wrap a two-parameter handler.
    pub fn wrap2<A, B>(
        &self,
        handler: impl Fn(A, B) + Send + Sync + 'static,
    ) -> impl Fn(A, B) + Send + Sync + 'static
    where
        A: Send + 'static,
        B: Send + 'static,
    {
        let jobs = self.jobs.clone();
        let handler = Arc::new(handler);
        move |a: A, b: B| {
            let handler = Arc::clone(&handler);
            let _ = jobs.send(Box::new(move || handler(a, b)));
        }
    }
}

impl Default for OffloadQueue {
    fn default() -> Self {
        Self::new()
    }
}
