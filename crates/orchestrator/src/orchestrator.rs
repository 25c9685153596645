//! # Critics Orchestrator
//!
//! Runs the network-facing batch operations:
//! 1. Scan the critics directory
//! 2. Fetch every critic's review history (network bound, worker pool)
//!
//! Normalizing and scoring only touch local files and live in
//! [`ReviewProcessor`](crate::processor::ReviewProcessor), which needs no
//! transport. [`Orchestrator::processor`] hands out one sharing the same
//! worker count and progress observer.
//!
//! Per-item failures are counted and reported; only setup failures (output
//! directory, unreadable inputs) abort an operation.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};

use fetch::{DirectoryScanner, Endpoints, History, PaginatedFetcher, Transport};
use pipeline::{ProgressCallback, ProgressSnapshot, WorkerPool};
use records::{Critic, JsonLinesStore, RecordStore, ensure_dir};

use crate::jobs::{FailedCritic, FetchJob};
use crate::processor::{ReviewProcessor, ensure_parent};

/// Outcome of [`Orchestrator::fetch_all`]
#[derive(Debug, Default)]
pub struct FetchReport {
    pub finished: usize,
    pub failed: Vec<FailedCritic>,
    pub reviews_written: usize,
}

/// Entry point for the operations that talk to the review site
pub struct Orchestrator<T: Transport> {
    transport: Arc<T>,
    endpoints: Endpoints,
    store: JsonLinesStore,
    workers: usize,
    on_progress: Option<ProgressCallback>,
}

impl<T: Transport + 'static> Orchestrator<T> {
    pub fn new(transport: Arc<T>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
            store: JsonLinesStore,
            workers: 1,
            on_progress: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Observe per-item progress of every pool this orchestrator runs
    pub fn with_progress(mut self, callback: impl Fn(ProgressSnapshot) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Offline processor sharing this orchestrator's workers and progress observer
    pub fn processor(&self) -> ReviewProcessor {
        ReviewProcessor::new(self.store)
            .with_workers(self.workers)
            .with_progress_callback(self.on_progress.clone())
    }

    fn pool(&self) -> WorkerPool {
        WorkerPool::new(self.workers).with_progress_callback(self.on_progress.clone())
    }

    fn fetcher(&self) -> PaginatedFetcher<T> {
        PaginatedFetcher::new(Arc::clone(&self.transport), self.endpoints.clone())
    }

    /// Scan every directory partition and write the critics file
    pub async fn scan_directory(&self, out_file: &Path) -> Result<Vec<Critic>> {
        let start_time = Instant::now();
        ensure_parent(out_file)?;

        let critics = DirectoryScanner::new(Arc::clone(&self.transport), self.endpoints.clone())
            .scan_all()
            .await;
        if critics.is_empty() {
            warn!("Directory scan found no critics");
        }

        let written = self
            .store
            .write(out_file, &critics)
            .with_context(|| format!("Failed to write critics to {}", out_file.display()))?;

        info!(
            critics = written,
            elapsed = ?start_time.elapsed(),
            "Directory scan done"
        );
        Ok(critics)
    }

    /// Full history of one critic, without touching disk
    pub async fn fetch_one(&self, critic_id: &str) -> History {
        self.fetcher().fetch_all(&Critic::new(critic_id, critic_id)).await
    }

    /// Fetch the history of every critic in `critics_file` into `out_dir`
    pub async fn fetch_all(&self, critics_file: &Path, out_dir: &Path) -> Result<FetchReport> {
        let start_time = Instant::now();
        ensure_dir(out_dir).context("Failed to create reviews directory")?;

        let critics: Vec<Critic> = self
            .store
            .read(critics_file)
            .map_err(|e| e.into_setup())
            .with_context(|| format!("Failed to read critics from {}", critics_file.display()))?;
        info!(critics = critics.len(), workers = self.workers, "Fetching review histories");

        let job = Arc::new(FetchJob::new(self.fetcher(), self.store, out_dir));
        let report = self.pool().run(critics, job).await;

        let mut fetch_report = FetchReport::default();
        for summary in report.aggregates {
            fetch_report.finished += summary.finished;
            fetch_report.reviews_written += summary.reviews_written;
            fetch_report.failed.extend(summary.failed);
        }

        info!(
            finished = fetch_report.finished,
            failed = fetch_report.failed.len(),
            reviews = fetch_report.reviews_written,
            elapsed = ?start_time.elapsed(),
            "Fetch done"
        );
        Ok(fetch_report)
    }
}
