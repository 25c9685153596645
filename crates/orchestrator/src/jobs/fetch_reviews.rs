//! Fetch every critic's history and persist it, one file per critic.

use async_trait::async_trait;
use fetch::{PaginatedFetcher, Transport};
use pipeline::{Progress, SliceJob};
use records::{Critic, JsonLinesStore, RecordStore};
use std::path::PathBuf;
use tracing::{debug, warn};

/// A critic that could not be fetched completely
#[derive(Debug, Clone)]
pub struct FailedCritic {
    pub critic: Critic,
    pub reason: String,
}

/// Per-worker result of a [`FetchJob`]
#[derive(Debug, Default)]
pub struct FetchSummary {
    pub finished: usize,
    pub failed: Vec<FailedCritic>,
    pub reviews_written: usize,
}

impl FetchSummary {
    fn fail(&mut self, critic: Critic, reason: impl Into<String>, progress: &Progress) {
        let reason = reason.into();
        warn!(critic = %critic.id, reason = %reason, "Critic failed");
        self.failed.push(FailedCritic { critic, reason });
        progress.failed();
    }
}

/// Writes `<out_dir>/<critic id>.jsonl` for every critic of its slice
pub struct FetchJob<T: Transport> {
    fetcher: PaginatedFetcher<T>,
    store: JsonLinesStore,
    out_dir: PathBuf,
}

impl<T: Transport> FetchJob<T> {
    pub fn new(fetcher: PaginatedFetcher<T>, store: JsonLinesStore, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            store,
            out_dir: out_dir.into(),
        }
    }
}

#[async_trait]
impl<T: Transport + 'static> SliceJob for FetchJob<T> {
    type Item = Critic;
    type Aggregate = FetchSummary;

    fn name(&self) -> &str {
        "fetch"
    }

    async fn run_slice(&self, worker: usize, slice: Vec<Critic>, progress: Progress) -> FetchSummary {
        let mut summary = FetchSummary::default();

        for critic in slice {
            // The id becomes a file name under out_dir
            if !critic.has_safe_id() {
                summary.fail(critic, "unsafe critic id", &progress);
                continue;
            }

            let history = self.fetcher.fetch_all(&critic).await;

            if history.reviews.is_empty() {
                let reason = match history.error {
                    Some(err) => err.to_string(),
                    None => "no reviews found".to_string(),
                };
                summary.fail(critic, reason, &progress);
                continue;
            }

            // Partial histories are kept on disk but still count as failed
            let path = self.out_dir.join(critic.file_name());
            match self.store.write(&path, &history.reviews) {
                Err(err) => summary.fail(critic, err.to_string(), &progress),
                Ok(0) => summary.fail(critic, "no reviews written", &progress),
                Ok(written) => {
                    summary.reviews_written += written;
                    match history.error {
                        Some(err) => {
                            summary.fail(critic, format!("partial history ({written} reviews kept): {err}"), &progress)
                        }
                        None => {
                            debug!(worker, critic = %critic.id, written, pages = history.pages, "Critic done");
                            summary.finished += 1;
                            progress.finished();
                        }
                    }
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetch::{CannedTransport, Endpoints};
    use pipeline::WorkerPool;
    use records::RawReview;
    use std::sync::Arc;
    use tempfile::TempDir;

    const BASE: &str = "http://critics.test";

    fn first_page(reviews: &str, end_cursor: &str) -> String {
        format!(
            r#"<html><script id="reviews-json" type="application/json">{{"pageInfo":{{"endCursor":"{end_cursor}"}},"reviews":[{reviews}]}}</script></html>"#
        )
    }

    fn review(score: &str, url: &str) -> String {
        format!(r#"{{"originalScore":"{score}","mediaTitle":"T","mediaInfo":"I","mediaUrl":"{url}"}}"#)
    }

    #[tokio::test]
    async fn test_unsafe_id_is_failed_without_request_or_write() {
        let root = TempDir::new().unwrap();
        let out_dir = root.path().join("reviews");
        std::fs::create_dir(&out_dir).unwrap();

        let transport = Arc::new(CannedTransport::new().with_body(
            format!("{BASE}/critics/../evil/movies"),
            first_page(&review("4/5", "/m/a"), ""),
        ));
        let fetcher = PaginatedFetcher::new(Arc::clone(&transport), Endpoints::new(BASE));
        let job = Arc::new(FetchJob::new(fetcher, JsonLinesStore, &out_dir));

        let report = WorkerPool::new(1)
            .run(vec![Critic::new("Evil", "../evil")], job)
            .await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.aggregates[0].failed[0].reason, "unsafe critic id");
        assert!(transport.requests().is_empty());
        assert!(!root.path().join("evil.jsonl").exists());
    }

    #[tokio::test]
    async fn test_fetch_job_classifies_critics() {
        let transport = CannedTransport::new()
            .with_body(
                format!("{BASE}/critics/whole/movies"),
                first_page(&review("4/5", "/m/a"), ""),
            )
            .with_body(
                format!("{BASE}/critics/partial/movies"),
                first_page(&review("3/5", "/m/b"), "c1"),
            )
            .with_status(
                format!("{BASE}/napi/critics/partial/movies?after=c1&pagecount=50"),
                500,
            )
            .with_body(format!("{BASE}/critics/silent/movies"), "<html></html>");

        let dir = TempDir::new().unwrap();
        let fetcher = PaginatedFetcher::new(Arc::new(transport), Endpoints::new(BASE));
        let job = Arc::new(FetchJob::new(fetcher, JsonLinesStore, dir.path()));

        let critics = vec![
            Critic::new("Whole", "whole"),
            Critic::new("Partial", "partial"),
            Critic::new("Silent", "silent"),
            Critic::new("Missing", "missing"),
        ];
        let report = WorkerPool::new(2).run(critics, job).await;

        assert_eq!(report.finished, 1);
        assert_eq!(report.failed, 3);

        let summaries = report.aggregates;
        let failed: Vec<&str> = summaries
            .iter()
            .flat_map(|s| s.failed.iter().map(|f| f.critic.id.as_str()))
            .collect();
        assert_eq!(failed, vec!["partial", "silent", "missing"]);
        assert_eq!(summaries.iter().map(|s| s.reviews_written).sum::<usize>(), 2);

        // The partial history is still on disk
        let kept: Vec<RawReview> = JsonLinesStore.read(&dir.path().join("partial.jsonl")).unwrap();
        assert_eq!(kept.len(), 1);
        assert!(dir.path().join("whole.jsonl").exists());
        assert!(!dir.path().join("silent.jsonl").exists());
    }
}
