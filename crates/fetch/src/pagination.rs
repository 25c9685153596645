//! Cursor-driven retrieval of a critic's full review history.
//!
//! ## Protocol
//! 1. Request the critic's first page (HTML with an embedded JSON batch)
//! 2. While the last batch returned a cursor, request the page after it
//! 3. Concatenate every batch's reviews in retrieval order
//!
//! Pages are strictly sequential per critic. The first failing page ends the
//! chain; whatever was accumulated before it is still returned.
//!
//! ## End of history
//! A batch without a cursor (missing or empty `endCursor`) is the last one.
//! In addition, a batch whose `pageInfo` carries an explicit
//! `hasNextPage: false` is treated as the last one even if it also carries a
//! cursor. A missing `hasNextPage` falls back to the cursor rule.

use crate::endpoints::Endpoints;
use crate::payload::{PageInfo, extract_embedded_batch, parse_review_batch};
use crate::transport::Transport;
use records::{Critic, FinderError, RawReview, Result};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Continuation state of a critic's history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// More reviews exist after this opaque token
    HasMore(String),
    /// The last batch has been retrieved
    Exhausted,
}

impl Cursor {
    pub(crate) fn from_page_info(info: &PageInfo) -> Self {
        if info.has_next_page == Some(false) {
            return Cursor::Exhausted;
        }
        match info.end_cursor.as_deref() {
            Some(cursor) if !cursor.is_empty() => Cursor::HasMore(cursor.to_string()),
            _ => Cursor::Exhausted,
        }
    }
}

/// One page of a critic's history plus its continuation
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewBatch {
    pub reviews: Vec<RawReview>,
    pub next: Cursor,
}

/// Everything retrieved for one critic
///
/// `error` is set when a page failed; `reviews` then holds the pages
/// retrieved before the failure.
#[derive(Debug)]
pub struct History {
    pub reviews: Vec<RawReview>,
    pub pages: usize,
    pub error: Option<FinderError>,
}

impl History {
    /// True when the chain ran until an exhausted cursor
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// All-or-nothing view: drop partial results if any page failed
    pub fn into_result(self) -> Result<Vec<RawReview>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.reviews),
        }
    }
}

/// Retrieves critic histories page by page through a [`Transport`]
pub struct PaginatedFetcher<T: Transport> {
    transport: Arc<T>,
    endpoints: Endpoints,
}

impl<T: Transport> Clone for PaginatedFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            endpoints: self.endpoints.clone(),
        }
    }
}

impl<T: Transport> PaginatedFetcher<T> {
    pub fn new(transport: Arc<T>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Retrieve the full history of `critic`
    #[instrument(skip(self, critic), fields(critic = %critic.id))]
    pub async fn fetch_all(&self, critic: &Critic) -> History {
        let mut history = History {
            reviews: Vec::new(),
            pages: 0,
            error: None,
        };

        let first = match self.first_batch(critic).await {
            Ok(Some(batch)) => batch,
            Ok(None) => {
                debug!("First page carries no reviews");
                return history;
            }
            Err(err) => {
                warn!(error = %err, "First page failed");
                history.error = Some(err);
                return history;
            }
        };

        history.pages = 1;
        history.reviews.extend(first.reviews);
        let mut cursor = first.next;

        while let Cursor::HasMore(after) = cursor {
            debug!(page = history.pages + 1, "Loading next page");
            match self.next_batch(critic, &after).await {
                Ok(batch) => {
                    history.pages += 1;
                    history.reviews.extend(batch.reviews);
                    cursor = batch.next;
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        kept = history.reviews.len(),
                        "Page failed, keeping partial history"
                    );
                    history.error = Some(err);
                    break;
                }
            }
        }

        debug!(pages = history.pages, reviews = history.reviews.len(), "History retrieved");
        history
    }

    /// The first batch, or `None` when the page embeds no reviews
    async fn first_batch(&self, critic: &Critic) -> Result<Option<ReviewBatch>> {
        let url = self.endpoints.first_page(&critic.id);
        let body = self.transport.get(&url).await?;

        match extract_embedded_batch(&body) {
            Some(json) => parse_review_batch(json, &url).map(Some),
            None => Ok(None),
        }
    }

    async fn next_batch(&self, critic: &Critic, cursor: &str) -> Result<ReviewBatch> {
        let url = self.endpoints.next_page(&critic.id, cursor);
        let body = self.transport.get(&url).await?;
        parse_review_batch(&body, &url)
    }
}
