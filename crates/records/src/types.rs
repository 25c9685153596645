//! Core domain types shared across the workspace.
//!
//! Critics are discovered once and never mutated. Reviews, normalized reviews
//! and media are append-only outputs of a single fetch or normalize pass.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Type Aliases
// =============================================================================

/// Stable, URL-safe identifier of a critic (also the stem of its files)
pub type CriticId = String;

// =============================================================================
// Critic
// =============================================================================

/// A reviewer being tracked
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Critic {
    pub name: String,
    pub id: CriticId,
}

impl Critic {
    pub fn new(name: impl Into<String>, id: impl Into<CriticId>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// Whether `id` is a single URL-safe path segment (`[A-Za-z0-9_.-]+`,
    /// never `.` or `..`), so it can be used in urls and file names as is
    pub fn has_safe_id(&self) -> bool {
        !self.id.is_empty()
            && self.id != "."
            && self.id != ".."
            && self
                .id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    }

    /// File name used for this critic's per-critic record files
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.id, crate::paths::RECORD_EXTENSION)
    }
}

impl fmt::Display for Critic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

// =============================================================================
// Reviews
// =============================================================================

/// A review as published by the source; `score` is free-form text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReview {
    pub score: String,
    pub media_title: String,
    pub media_info: String,
    /// Stable join key to [`Media`]
    pub media_url: String,
}

/// A review whose score has been mapped onto `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReview {
    pub score: f32,
    pub media_url: String,
}

impl NormalizedReview {
    pub fn new(score: f32, media_url: impl Into<String>) -> Self {
        Self {
            score,
            media_url: media_url.into(),
        }
    }
}

impl fmt::Display for NormalizedReview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} {}", self.score, self.media_url)
    }
}

// =============================================================================
// Media
// =============================================================================

/// A rated work; `media_url` is its identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub title: String,
    pub info: String,
    pub media_url: String,
}

impl From<&RawReview> for Media {
    fn from(review: &RawReview) -> Self {
        Self {
            title: review.media_title.clone(),
            info: review.media_info.clone(),
            media_url: review.media_url.clone(),
        }
    }
}

impl fmt::Display for Media {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.info.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} [{}]", self.title, self.info)
        }
    }
}

// =============================================================================
// Scoring
// =============================================================================

/// A critic with its distance to the reference ratings
///
/// Lower is more similar; `f64::INFINITY` means no overlapping media.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCritic {
    pub critic: Critic,
    pub score: f64,
}

impl ScoredCritic {
    /// Whether the critic shared at least one rated media with the reference
    pub fn is_comparable(&self) -> bool {
        self.score.is_finite()
    }
}
