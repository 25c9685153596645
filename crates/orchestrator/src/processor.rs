//! Offline stages: normalizing stored reviews and scoring critics.
//!
//! Everything here reads and writes local record files only.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};

use pipeline::{ProgressCallback, ProgressSnapshot, SimilarityScorer, WorkerPool, dedupe};
use records::{Critic, JsonLinesStore, RecordStore, ScoredCritic, ensure_dir, list_record_files};

use crate::jobs::{FailedFile, NormalizeJob};
use crate::loader::load_critic_ratings;
use crate::reference::ReferenceRatings;

/// Outcome of [`ReviewProcessor::normalize_all`]
#[derive(Debug, Default)]
pub struct NormalizeReport {
    pub files_normalized: usize,
    pub failed_files: Vec<FailedFile>,
    pub normalized: usize,
    pub empty_scores: usize,
    pub error_scores: usize,
    pub media_written: usize,
}

/// Runs normalize and score over files on disk
#[derive(Clone)]
pub struct ReviewProcessor {
    store: JsonLinesStore,
    workers: usize,
    on_progress: Option<ProgressCallback>,
}

impl ReviewProcessor {
    pub fn new(store: JsonLinesStore) -> Self {
        Self {
            store,
            workers: 1,
            on_progress: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_progress(mut self, callback: impl Fn(ProgressSnapshot) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn with_progress_callback(mut self, callback: Option<ProgressCallback>) -> Self {
        self.on_progress = callback;
        self
    }

    fn pool(&self) -> WorkerPool {
        WorkerPool::new(self.workers).with_progress_callback(self.on_progress.clone())
    }

    /// Normalize every review file in `in_dir` into `out_dir` and write the
    /// deduplicated media catalog to `media_file`
    pub async fn normalize_all(&self, in_dir: &Path, out_dir: &Path, media_file: &Path) -> Result<NormalizeReport> {
        let start_time = Instant::now();

        let files = list_record_files(in_dir)
            .map_err(|e| e.into_setup())
            .with_context(|| format!("Failed to list review files in {}", in_dir.display()))?;
        ensure_dir(out_dir).context("Failed to create normalized directory")?;
        ensure_parent(media_file)?;
        info!(files = files.len(), workers = self.workers, "Normalizing reviews");

        let job = Arc::new(NormalizeJob::new(self.store, out_dir));
        let report = self.pool().run(files, job).await;

        let mut normalize_report = NormalizeReport::default();
        let mut media_lists = Vec::with_capacity(report.aggregates.len());
        for summary in report.aggregates {
            normalize_report.files_normalized += summary.files_normalized;
            normalize_report.normalized += summary.normalized;
            normalize_report.empty_scores += summary.empty_scores;
            normalize_report.error_scores += summary.error_scores;
            normalize_report.failed_files.extend(summary.failed_files);
            media_lists.push(summary.media);
        }

        let media = dedupe(media_lists);
        normalize_report.media_written = self
            .store
            .write(media_file, &media)
            .with_context(|| format!("Failed to write media to {}", media_file.display()))?;

        info!(
            files = normalize_report.files_normalized,
            failed = normalize_report.failed_files.len(),
            normalized = normalize_report.normalized,
            empty = normalize_report.empty_scores,
            errors = normalize_report.error_scores,
            media = normalize_report.media_written,
            elapsed = ?start_time.elapsed(),
            "Normalize done"
        );
        Ok(normalize_report)
    }

    /// Rank the critics of `critics_file` by distance to the reference ratings
    pub async fn score(
        &self,
        reference_file: &Path,
        critics_file: &Path,
        normalized_dir: &Path,
    ) -> Result<Vec<ScoredCritic>> {
        let start_time = Instant::now();

        let reference = ReferenceRatings::load(self.store, reference_file)
            .map_err(|e| e.into_setup())
            .context("Failed to load reference ratings")?
            .into_ratings();
        if reference.is_empty() {
            warn!("No reference ratings; every critic will score +inf");
        }

        let critics: Vec<Critic> = self
            .store
            .read(critics_file)
            .map_err(|e| e.into_setup())
            .with_context(|| format!("Failed to read critics from {}", critics_file.display()))?;

        let candidates = tokio::task::spawn_blocking({
            let store = self.store;
            let dir = PathBuf::from(normalized_dir);
            move || load_critic_ratings(&store, &dir)
        })
        .await
        .context("Ratings loader panicked")?
        .map_err(|e| e.into_setup())
        .context("Failed to load critic ratings")?;

        let ranked = SimilarityScorer::new(self.workers)
            .with_progress_callback(self.on_progress.clone())
            .score(Arc::new(reference), Arc::new(candidates), critics)
            .await;

        info!(
            critics = ranked.len(),
            comparable = ranked.iter().filter(|s| s.is_comparable()).count(),
            elapsed = ?start_time.elapsed(),
            "Scoring done"
        );
        Ok(ranked)
    }
}

pub(crate) fn ensure_parent(file: &Path) -> Result<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            ensure_dir(parent).with_context(|| format!("Failed to create directory for {}", file.display()))
        }
        _ => Ok(()),
    }
}
