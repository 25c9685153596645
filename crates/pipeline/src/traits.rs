//! Core trait for batch jobs run by the worker pool.

use crate::pool::Progress;
use async_trait::async_trait;

/// A unit of batch work that processes one contiguous slice of items.
///
/// ## Design Note
/// - Everything a worker needs arrives as arguments: its index, its slice
///   and a progress handle. Implementors hold only read-only configuration.
/// - `run_slice` must report exactly one outcome per item on `progress`
///   and absorb per-item failures into its aggregate instead of returning
///   early.
#[async_trait]
pub trait SliceJob: Send + Sync + 'static {
    type Item: Send + 'static;
    type Aggregate: Default + Send + 'static;

    /// Returns the name of this job (for logging)
    fn name(&self) -> &str;

    /// Process `slice` to completion and summarize it
    async fn run_slice(
        &self,
        worker: usize,
        slice: Vec<Self::Item>,
        progress: Progress,
    ) -> Self::Aggregate;
}
