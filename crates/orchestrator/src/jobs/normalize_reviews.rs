//! Normalize every stored review file and collect the media it mentions.

use async_trait::async_trait;
use pipeline::{Progress, SliceJob, normalize};
use records::{JsonLinesStore, Media, NormalizedReview, RawReview, RecordStore, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A review file that could not be read or written
#[derive(Debug, Clone)]
pub struct FailedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Per-worker result of a [`NormalizeJob`]
#[derive(Debug, Default)]
pub struct NormalizeSummary {
    pub files_normalized: usize,
    pub failed_files: Vec<FailedFile>,
    pub normalized: usize,
    pub empty_scores: usize,
    pub error_scores: usize,
    /// One entry per normalized review, not yet deduplicated
    pub media: Vec<Media>,
}

/// Counts for one file
#[derive(Debug, Default)]
struct FileNormalization {
    normalized: usize,
    empty_scores: usize,
    error_scores: usize,
    media: Vec<Media>,
}

/// Reads raw review files and writes their normalized counterpart under
/// the same file name in `out_dir`
pub struct NormalizeJob {
    store: JsonLinesStore,
    out_dir: PathBuf,
}

impl NormalizeJob {
    pub fn new(store: JsonLinesStore, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            out_dir: out_dir.into(),
        }
    }
}

#[async_trait]
impl SliceJob for NormalizeJob {
    type Item = PathBuf;
    type Aggregate = NormalizeSummary;

    fn name(&self) -> &str {
        "normalize"
    }

    async fn run_slice(&self, worker: usize, slice: Vec<PathBuf>, progress: Progress) -> NormalizeSummary {
        let mut summary = NormalizeSummary::default();

        for input in slice {
            let Some(file_name) = input.file_name() else {
                summary.failed_files.push(FailedFile {
                    reason: "not a file path".to_string(),
                    path: input,
                });
                progress.failed();
                continue;
            };
            let output = self.out_dir.join(file_name);

            let task = tokio::task::spawn_blocking({
                let store = self.store;
                let input = input.clone();
                move || normalize_file(&store, &input, &output)
            });

            let reason = match task.await {
                Ok(Ok(file)) => {
                    debug!(worker, path = %input.display(), normalized = file.normalized, "File normalized");
                    summary.files_normalized += 1;
                    summary.normalized += file.normalized;
                    summary.empty_scores += file.empty_scores;
                    summary.error_scores += file.error_scores;
                    summary.media.extend(file.media);
                    progress.finished();
                    continue;
                }
                Ok(Err(err)) => err.to_string(),
                Err(err) => format!("normalize task aborted: {err}"),
            };

            warn!(path = %input.display(), reason = %reason, "File failed");
            summary.failed_files.push(FailedFile { path: input, reason });
            progress.failed();
        }

        summary
    }
}

fn normalize_file(store: &JsonLinesStore, input: &Path, output: &Path) -> Result<FileNormalization> {
    let reviews: Vec<RawReview> = store.read(input)?;
    let mut file = FileNormalization::default();
    let mut normalized = Vec::with_capacity(reviews.len());

    for review in &reviews {
        if review.score.is_empty() {
            file.empty_scores += 1;
            continue;
        }
        match normalize(&review.score) {
            Ok(score) => {
                normalized.push(NormalizedReview::new(score, &review.media_url));
                file.media.push(Media::from(review));
            }
            Err(err) => {
                debug!(path = %input.display(), error = %err, "Skipping unclassified score");
                file.error_scores += 1;
            }
        }
    }

    file.normalized = store.write(output, &normalized)?;
    Ok(file)
}
