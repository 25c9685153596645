//! Integration tests for the pipeline.
//!
//! These tests run raw reviews through normalization, media deduplication
//! and scoring the way the orchestrator chains them.

use pipeline::{SimilarityScorer, dedupe, normalize};
use records::{Critic, CriticId, Media, NormalizedReview, RawReview};
use std::collections::HashMap;
use std::sync::Arc;

fn raw(score: &str, title: &str, url: &str) -> RawReview {
    RawReview {
        score: score.to_string(),
        media_title: title.to_string(),
        media_info: "2001, Drama".to_string(),
        media_url: url.to_string(),
    }
}

fn create_test_reviews() -> Vec<(Critic, Vec<RawReview>)> {
    vec![
        (
            Critic::new("Ada Lane", "ada-lane"),
            vec![
                raw("4/5", "Heat", "/m/heat"),
                raw("B+", "Alien", "/m/alien"),
                raw("", "Unrated", "/m/unrated"),
                raw("banana", "Weird", "/m/weird"),
            ],
        ),
        (
            Critic::new("Bo Park", "bo-park"),
            vec![
                raw("1 out of 5 stars", "Heat", "/m/heat"),
                raw("2", "Alien", "/m/alien"),
            ],
        ),
        (
            Critic::new("Cy Moss", "cy-moss"),
            vec![raw("9/10", "Up", "/m/up")],
        ),
    ]
}

/// Normalize every review with a score, returning ratings and media seen
fn normalize_critic(reviews: &[RawReview]) -> (Vec<NormalizedReview>, Vec<Media>, usize) {
    let mut ratings = Vec::new();
    let mut media = Vec::new();
    let mut errors = 0;

    for review in reviews.iter().filter(|r| !r.score.is_empty()) {
        match normalize(&review.score) {
            Ok(score) => {
                ratings.push(NormalizedReview::new(score, &review.media_url));
                media.push(Media::from(review));
            }
            Err(_) => errors += 1,
        }
    }
    (ratings, media, errors)
}

#[tokio::test]
async fn test_end_to_end_ranking() {
    let mut candidates: HashMap<CriticId, Vec<NormalizedReview>> = HashMap::new();
    let mut media_lists = Vec::new();
    let mut errors = 0;
    let mut critics = Vec::new();

    for (critic, reviews) in create_test_reviews() {
        let (ratings, media, failed) = normalize_critic(&reviews);
        errors += failed;
        media_lists.push(media);
        candidates.insert(critic.id.clone(), ratings);
        critics.push(critic);
    }

    assert_eq!(errors, 1, "only 'banana' should fail");

    let media = dedupe(media_lists);
    let urls: Vec<&str> = media.iter().map(|m| m.media_url.as_str()).collect();
    assert_eq!(urls, vec!["/m/heat", "/m/alien", "/m/up"]);

    // Reference agrees with Ada exactly
    let reference = Arc::new(vec![
        NormalizedReview::new(0.8, "/m/heat"),
        NormalizedReview::new(11.0 / 14.0, "/m/alien"),
    ]);

    let ranked = SimilarityScorer::new(2)
        .score(reference, Arc::new(candidates), critics)
        .await;

    let ids: Vec<&str> = ranked.iter().map(|s| s.critic.id.as_str()).collect();
    assert_eq!(ids, vec!["ada-lane", "bo-park", "cy-moss"]);
    assert!(ranked[0].score < 1e-9);
    assert!(ranked[1].is_comparable());
    assert!(!ranked[2].is_comparable());
}

#[tokio::test]
async fn test_ranking_is_independent_of_worker_count() {
    let mut candidates: HashMap<CriticId, Vec<NormalizedReview>> = HashMap::new();
    let mut critics = Vec::new();
    for i in 0..17 {
        let id = format!("critic-{i}");
        let score = (i % 5) as f32 / 4.0;
        candidates.insert(id.clone(), vec![NormalizedReview::new(score, "/m/shared")]);
        critics.push(Critic::new(format!("Critic {i}"), id));
    }
    let candidates = Arc::new(candidates);
    let reference = Arc::new(vec![NormalizedReview::new(0.5, "/m/shared")]);

    let baseline = SimilarityScorer::new(1)
        .score(Arc::clone(&reference), Arc::clone(&candidates), critics.clone())
        .await;

    for workers in [2, 3, 8, 17, 40] {
        let ranked = SimilarityScorer::new(workers)
            .score(Arc::clone(&reference), Arc::clone(&candidates), critics.clone())
            .await;
        assert_eq!(ranked, baseline, "workers={workers}");
    }
}
