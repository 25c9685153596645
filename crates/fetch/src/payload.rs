//! Decoding of review pages.
//!
//! The first page of a critic is an HTML document with the batch embedded
//! as JSON in a script tag; every following page is that JSON directly.

use crate::pagination::{Cursor, ReviewBatch};
use once_cell::sync::Lazy;
use records::{FinderError, RawReview, Result};
use regex::Regex;
use serde::Deserialize;

static EMBEDDED_REVIEWS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<script id="reviews-json"[^>]*>(\{.+?)</script>"#).expect("valid regex")
});

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ReviewPage {
    page_info: PageInfo,
    reviews: Vec<ReviewEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PageInfo {
    pub(crate) has_next_page: Option<bool>,
    pub(crate) end_cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ReviewEntry {
    original_score: Option<String>,
    media_title: Option<String>,
    media_info: Option<String>,
    media_url: Option<String>,
}

impl From<ReviewEntry> for RawReview {
    fn from(entry: ReviewEntry) -> Self {
        RawReview {
            score: entry.original_score.unwrap_or_default(),
            media_title: entry.media_title.unwrap_or_default(),
            media_info: entry.media_info.unwrap_or_default(),
            media_url: entry.media_url.unwrap_or_default(),
        }
    }
}

/// Locate the JSON batch embedded in a critic's first page
pub fn extract_embedded_batch(html: &str) -> Option<&str> {
    EMBEDDED_REVIEWS
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Decode one page of reviews; `source` names the page in errors
pub fn parse_review_batch(json: &str, source: &str) -> Result<ReviewBatch> {
    let page: ReviewPage = serde_json::from_str(json).map_err(|e| FinderError::Parse {
        subject: "review page".to_string(),
        input: source.to_string(),
        reason: e.to_string(),
    })?;

    let next = Cursor::from_page_info(&page.page_info);
    let reviews = page.reviews.into_iter().map(RawReview::from).collect();

    Ok(ReviewBatch { reviews, next })
}
