//! # Fetch Crate
//!
//! Retrieval of critics and their review histories from the web source.
//!
//! ## Components
//!
//! ### DirectoryScanner
//! Walks the critics directory one partition (initial letter) at a time and
//! extracts critic entries from each listing page.
//!
//! ### PaginatedFetcher
//! Follows a critic's opaque continuation cursor until it is exhausted,
//! returning the full history or the part retrieved before a failure.
//!
//! ### Transport
//! The single-attempt GET contract both components use. `HttpTransport`
//! talks to the real source; `CannedTransport` answers from memory.
//!
//! ## Example Usage
//!
//! ```ignore
//! use fetch::{DirectoryScanner, Endpoints, HttpTransport, PaginatedFetcher};
//! use std::sync::Arc;
//!
//! let transport = Arc::new(HttpTransport::new(fetch::DEFAULT_TIMEOUT)?);
//! let scanner = DirectoryScanner::new(transport.clone(), Endpoints::default());
//! let critics = scanner.scan_all().await;
//!
//! let fetcher = PaginatedFetcher::new(transport, Endpoints::default());
//! let history = fetcher.fetch_all(&critics[0]).await;
//! ```

pub mod directory;
pub mod endpoints;
pub mod pagination;
pub mod payload;
pub mod transport;

// Re-export commonly used types
pub use directory::DirectoryScanner;
pub use endpoints::Endpoints;
pub use pagination::{Cursor, History, PaginatedFetcher, ReviewBatch};
pub use transport::{CannedTransport, DEFAULT_TIMEOUT, HttpTransport, Transport};
