//! Processing stages for critic reviews.
//!
//! This crate provides:
//! - SliceJob trait and the static-partition WorkerPool that runs it
//! - Rating normalization (numbers, fractions, letter grades)
//! - Media deduplication
//! - SimilarityScorer for ranking critics against reference ratings
//!
//! ## Architecture
//! Reviews go through the stages in order:
//! 1. `normalize` turns each raw score into a value in `[0, 1]`
//! 2. `dedupe` merges the media seen by every worker
//! 3. `SimilarityScorer` compares each critic to the reference ratings
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{normalize, SimilarityScorer};
//!
//! let score = normalize("3.5 out of 4 stars")?;
//!
//! let ranked = SimilarityScorer::new(8)
//!     .score(reference, candidates, critics)
//!     .await;
//! ```

pub mod traits;
pub mod pool;
pub mod grades;
pub mod normalize;
pub mod dedupe;
pub mod scoring;

// Re-export main types
pub use traits::SliceJob;
pub use pool::{ItemOutcome, PoolReport, Progress, ProgressCallback, ProgressSnapshot, WorkerPool, partition};
pub use normalize::normalize;
pub use dedupe::dedupe;
pub use scoring::{SimilarityScorer, distance, rank};
