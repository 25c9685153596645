//! Similarity scoring of critics against the reference ratings.
//!
//! ## Algorithm
//! For each critic:
//! 1. No rating list at all => `+inf`
//! 2. Otherwise, pair every reference rating with the critic's rating of the
//!    same media (first one if the critic rated it twice)
//! 3. Distance = mean squared difference over the pairs; no pairs => `+inf`
//!
//! Critics are scored through the [`WorkerPool`], then sorted ascending with
//! a stable sort so ties keep input order for any worker count.

use crate::pool::{Progress, ProgressCallback, WorkerPool};
use crate::traits::SliceJob;
use async_trait::async_trait;
use records::{Critic, CriticId, NormalizedReview, ScoredCritic};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Ranks critics by distance to a reference rating set
#[derive(Clone)]
pub struct SimilarityScorer {
    workers: usize,
    on_progress: Option<ProgressCallback>,
}

impl SimilarityScorer {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            on_progress: None,
        }
    }

    /// Report scoring progress through `callback`
    pub fn with_progress_callback(mut self, callback: Option<ProgressCallback>) -> Self {
        self.on_progress = callback;
        self
    }

    /// Score every critic and return them best match first
    #[instrument(skip_all, fields(critics = critics.len(), reference = reference.len()))]
    pub async fn score(
        &self,
        reference: Arc<Vec<NormalizedReview>>,
        candidates: Arc<HashMap<CriticId, Vec<NormalizedReview>>>,
        critics: Vec<Critic>,
    ) -> Vec<ScoredCritic> {
        let job = Arc::new(ScoreJob {
            reference,
            candidates,
        });
        let pool = WorkerPool::new(self.workers).with_progress_callback(self.on_progress.clone());
        let report = pool.run(critics, job).await;

        let mut scored: Vec<ScoredCritic> = report.aggregates.into_iter().flatten().collect();
        rank(&mut scored);

        debug!(
            comparable = scored.iter().filter(|s| s.is_comparable()).count(),
            "Scored critics"
        );
        scored
    }
}

/// Stable ascending sort by distance
pub fn rank(scored: &mut [ScoredCritic]) {
    scored.sort_by(|a, b| a.score.total_cmp(&b.score));
}

/// Mean squared difference over the media both lists rated
pub fn distance(reference: &[NormalizedReview], candidate: &[NormalizedReview]) -> f64 {
    let mut by_media: HashMap<&str, f32> = HashMap::with_capacity(candidate.len());
    for rating in candidate {
        by_media.entry(rating.media_url.as_str()).or_insert(rating.score);
    }

    let mut total = 0.0f64;
    let mut matches = 0usize;
    for rating in reference {
        if let Some(&score) = by_media.get(rating.media_url.as_str()) {
            let diff = f64::from(rating.score) - f64::from(score);
            total += diff * diff;
            matches += 1;
        }
    }

    if matches == 0 {
        f64::INFINITY
    } else {
        total / matches as f64
    }
}

/// Pool job scoring one slice of critics; its aggregate is that slice scored
struct ScoreJob {
    reference: Arc<Vec<NormalizedReview>>,
    candidates: Arc<HashMap<CriticId, Vec<NormalizedReview>>>,
}

#[async_trait]
impl SliceJob for ScoreJob {
    type Item = Critic;
    type Aggregate = Vec<ScoredCritic>;

    fn name(&self) -> &str {
        "score"
    }

    async fn run_slice(&self, _worker: usize, slice: Vec<Critic>, progress: Progress) -> Vec<ScoredCritic> {
        let mut scored = Vec::with_capacity(slice.len());
        for critic in slice {
            let score = match self.candidates.get(&critic.id) {
                Some(ratings) => distance(&self.reference, ratings),
                None => f64::INFINITY,
            };
            scored.push(ScoredCritic { critic, score });
            progress.finished();
        }
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings(pairs: &[(f32, &str)]) -> Vec<NormalizedReview> {
        pairs
            .iter()
            .map(|&(score, url)| NormalizedReview::new(score, url))
            .collect()
    }

    #[test]
    fn test_distance_over_overlap_only() {
        let reference = ratings(&[(0.5, "a"), (1.0, "b")]);

        assert_eq!(distance(&reference, &ratings(&[(0.5, "a")])), 0.0);
        assert_eq!(distance(&reference, &ratings(&[(0.5, "z")])), f64::INFINITY);
        assert_eq!(distance(&reference, &[]), f64::INFINITY);

        let d = distance(&reference, &ratings(&[(0.0, "a"), (0.5, "b")]));
        assert!((d - (0.25 + 0.25) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_uses_first_candidate_rating_per_media() {
        let reference = ratings(&[(1.0, "a")]);
        let candidate = ratings(&[(1.0, "a"), (0.0, "a")]);
        assert_eq!(distance(&reference, &candidate), 0.0);
    }

    #[test]
    fn test_rank_is_stable() {
        let mut scored: Vec<ScoredCritic> = [("x", 1.0), ("y", f64::INFINITY), ("z", 0.5), ("w", 1.0)]
            .into_iter()
            .map(|(id, score)| ScoredCritic {
                critic: Critic::new(id, id),
                score,
            })
            .collect();

        rank(&mut scored);
        let ids: Vec<&str> = scored.iter().map(|s| s.critic.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "x", "w", "y"]);
    }

    #[tokio::test]
    async fn test_score_ranks_matches_before_unknowns() {
        let reference = Arc::new(ratings(&[(0.5, "a"), (1.0, "b")]));
        let mut candidates = HashMap::new();
        candidates.insert("perfect".to_string(), ratings(&[(0.5, "a")]));
        candidates.insert("disjoint".to_string(), ratings(&[(0.2, "q")]));
        candidates.insert("off".to_string(), ratings(&[(0.0, "b")]));
        let candidates = Arc::new(candidates);

        let critics = vec![
            Critic::new("Missing", "missing"),
            Critic::new("Disjoint", "disjoint"),
            Critic::new("Off", "off"),
            Critic::new("Perfect", "perfect"),
        ];

        for workers in 1..=4 {
            let scored = SimilarityScorer::new(workers)
                .score(Arc::clone(&reference), Arc::clone(&candidates), critics.clone())
                .await;

            let ids: Vec<&str> = scored.iter().map(|s| s.critic.id.as_str()).collect();
            // Infinite ties keep input order
            assert_eq!(ids, vec!["perfect", "off", "missing", "disjoint"], "workers={workers}");
            assert_eq!(scored[0].score, 0.0);
            assert!((scored[1].score - 1.0).abs() < 1e-9);
            assert!(scored[2].score.is_infinite());
        }
    }
}
