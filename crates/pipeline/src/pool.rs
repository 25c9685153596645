//! Static-partition worker pool.
//!
//! The input is cut into `W` contiguous slices and one tokio task runs each
//! slice to completion. There is no work stealing and no coordination between
//! workers while they run. The coordinator:
//! 1. drains one outcome per item from a shared channel (arrival order,
//!    used only for progress accounting),
//! 2. then collects one aggregate per worker, in worker order.

use crate::traits::SliceJob;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Completion signal of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Finished,
    Failed,
}

/// Handle a worker uses to signal per-item completion
#[derive(Debug, Clone)]
pub struct Progress {
    tx: mpsc::UnboundedSender<ItemOutcome>,
}

impl Progress {
    pub fn finished(&self) {
        self.report(ItemOutcome::Finished);
    }

    pub fn failed(&self) {
        self.report(ItemOutcome::Failed);
    }

    pub fn report(&self, outcome: ItemOutcome) {
        // The coordinator stops listening once every item is accounted for
        let _ = self.tx.send(outcome);
    }
}

/// Running totals seen by the coordinator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub done: usize,
    pub total: usize,
    pub finished: usize,
    pub failed: usize,
}

impl ProgressSnapshot {
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            100.0
        } else {
            100.0 * self.done as f32 / self.total as f32
        }
    }

    fn record(&mut self, outcome: ItemOutcome) {
        self.done += 1;
        match outcome {
            ItemOutcome::Finished => self.finished += 1,
            ItemOutcome::Failed => self.failed += 1,
        }
    }
}

/// What a pool run produced
#[derive(Debug)]
pub struct PoolReport<A> {
    /// Per-item outcomes in arrival order
    pub outcomes: Vec<ItemOutcome>,
    /// One aggregate per worker, ordered by worker index
    pub aggregates: Vec<A>,
    pub finished: usize,
    pub failed: usize,
}

pub type ProgressCallback = Arc<dyn Fn(ProgressSnapshot) + Send + Sync>;

/// Fan-out/fan-in executor over contiguous slices
#[derive(Clone)]
pub struct WorkerPool {
    workers: usize,
    on_progress: Option<ProgressCallback>,
}

impl WorkerPool {
    /// Create a pool of `workers` workers; values below one mean one
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            on_progress: None,
        }
    }

    /// Call `callback` after every item outcome the coordinator receives
    pub fn with_progress(mut self, callback: impl Fn(ProgressSnapshot) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Share an existing callback (used when one observer watches several pools)
    pub fn with_progress_callback(mut self, callback: Option<ProgressCallback>) -> Self {
        self.on_progress = callback;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `job` over `items` and wait for every worker.
    ///
    /// Never fails: a worker that panics is logged, its unsignalled items are
    /// counted as failed and its aggregate is `Default::default()`.
    pub async fn run<J: SliceJob>(&self, items: Vec<J::Item>, job: Arc<J>) -> PoolReport<J::Aggregate> {
        let total = items.len();
        let slices = partition(items, self.workers);
        info!(
            job = job.name(),
            items = total,
            workers = slices.len(),
            "Starting pool"
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handles = Vec::with_capacity(slices.len());
        for (worker, slice) in slices.into_iter().enumerate() {
            debug!(job = job.name(), worker, items = slice.len(), "Spawning worker");
            let job = Arc::clone(&job);
            let progress = Progress { tx: tx.clone() };
            handles.push(tokio::spawn(async move {
                job.run_slice(worker, slice, progress).await
            }));
        }
        // Only workers hold senders now, so the channel closes when they all end
        drop(tx);

        let mut snapshot = ProgressSnapshot {
            total,
            ..ProgressSnapshot::default()
        };
        let mut outcomes = Vec::with_capacity(total);
        while snapshot.done < total {
            let Some(outcome) = rx.recv().await else {
                break;
            };
            outcomes.push(outcome);
            snapshot.record(outcome);
            if let Some(callback) = &self.on_progress {
                callback(snapshot);
            }
        }

        if snapshot.done < total {
            let missing = total - snapshot.done;
            warn!(job = job.name(), missing, "Workers ended without reporting every item");
            for _ in 0..missing {
                outcomes.push(ItemOutcome::Failed);
                snapshot.record(ItemOutcome::Failed);
            }
            if let Some(callback) = &self.on_progress {
                callback(snapshot);
            }
        }

        let mut aggregates = Vec::with_capacity(handles.len());
        for (worker, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(aggregate) => aggregates.push(aggregate),
                Err(e) => {
                    error!(job = job.name(), worker, error = %e, "Worker aborted");
                    aggregates.push(J::Aggregate::default());
                }
            }
        }

        info!(
            job = job.name(),
            finished = snapshot.finished,
            failed = snapshot.failed,
            "Pool done"
        );

        PoolReport {
            outcomes,
            aggregates,
            finished: snapshot.finished,
            failed: snapshot.failed,
        }
    }
}

/// Split `items` into exactly `max(workers, 1)` contiguous slices of
/// `ceil(len / workers)` items; trailing slices may be short or empty.
pub fn partition<T>(items: Vec<T>, workers: usize) -> Vec<Vec<T>> {
    let workers = workers.max(1);
    let step = items.len().div_ceil(workers);

    let mut slices = Vec::with_capacity(workers);
    let mut rest = items.into_iter();
    for _ in 0..workers {
        slices.push(rest.by_ref().take(step).collect());
    }
    slices
}
