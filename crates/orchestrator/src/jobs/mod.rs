//! Pool jobs run by the [`Orchestrator`](crate::Orchestrator).

pub mod fetch_reviews;
pub mod normalize_reviews;

pub use fetch_reviews::{FailedCritic, FetchJob, FetchSummary};
pub use normalize_reviews::{FailedFile, NormalizeJob, NormalizeSummary};
