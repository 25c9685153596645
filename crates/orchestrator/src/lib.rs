//! Batch operations of the critics finder.
//!
//! This crate provides:
//! - `Orchestrator`: scan and fetch entry points (needs a transport)
//! - `ReviewProcessor`: normalize and score entry points (local files only)
//! - Pool jobs for fetching and normalizing (`jobs`)
//! - Parallel loading of normalized ratings (`loader`)
//! - The user's reference ratings and media search (`reference`)
//!
//! ## Example Usage
//! ```ignore
//! use fetch::{Endpoints, HttpTransport, DEFAULT_TIMEOUT};
//! use orchestrator::Orchestrator;
//!
//! let transport = Arc::new(HttpTransport::new(DEFAULT_TIMEOUT)?);
//! let orchestrator = Orchestrator::new(transport, Endpoints::default()).with_workers(8);
//!
//! let report = orchestrator.fetch_all(critics_file, reviews_dir).await?;
//! println!("{} critics fetched, {} failed", report.finished, report.failed.len());
//! ```

pub mod jobs;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod reference;

// Re-export main types
pub use jobs::{FailedCritic, FailedFile};
pub use loader::load_critic_ratings;
pub use orchestrator::{FetchReport, Orchestrator};
pub use processor::{NormalizeReport, ReviewProcessor};
pub use reference::{ReferenceRatings, search_media};
