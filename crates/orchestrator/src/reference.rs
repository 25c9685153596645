//! The user's own ratings and the media catalog they are picked from.

use pipeline::normalize;
use records::{JsonLinesStore, Media, NormalizedReview, RecordStore, Result, ensure_dir};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reference rating set persisted in one record file
#[derive(Debug, Clone)]
pub struct ReferenceRatings {
    path: PathBuf,
    store: JsonLinesStore,
    ratings: Vec<NormalizedReview>,
}

impl ReferenceRatings {
    /// Load `path`; a missing file is an empty rating set
    pub fn load(store: JsonLinesStore, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let ratings = if path.exists() {
            store.read(&path)?
        } else {
            debug!(path = %path.display(), "No reference ratings yet");
            Vec::new()
        };

        Ok(Self { path, store, ratings })
    }

    pub fn ratings(&self) -> &[NormalizedReview] {
        &self.ratings
    }

    pub fn into_ratings(self) -> Vec<NormalizedReview> {
        self.ratings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rate `media_url` with a raw score in any notation the normalizer
    /// accepts, replacing a previous rating of the same media
    pub fn rate(&mut self, media_url: &str, raw: &str) -> Result<f32> {
        let score = normalize(raw)?;
        match self.ratings.iter_mut().find(|r| r.media_url == media_url) {
            Some(existing) => existing.score = score,
            None => self.ratings.push(NormalizedReview::new(score, media_url)),
        }
        Ok(score)
    }

    /// Drop the rating of `media_url`; false if there was none
    pub fn remove(&mut self, media_url: &str) -> bool {
        let before = self.ratings.len();
        self.ratings.retain(|r| r.media_url != media_url);
        self.ratings.len() != before
    }

    pub fn save(&self) -> Result<usize> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        let written = self.store.write(&self.path, &self.ratings)?;
        info!(path = %self.path.display(), written, "Saved reference ratings");
        Ok(written)
    }
}

/// Case-insensitive title search: exact matches first, then titles that
/// contain `query`, each group in catalog order
pub fn search_media<'a>(media: &'a [Media], query: &str) -> Vec<&'a Media> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut exact = Vec::new();
    let mut partial = Vec::new();
    for m in media {
        let title = m.title.to_lowercase();
        if title == needle {
            exact.push(m);
        } else if title.contains(&needle) {
            partial.push(m);
        }
    }

    exact.extend(partial);
    exact
}
