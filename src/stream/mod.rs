//! Stream utilities for snapshot publication

mod aggregator;
mod batch;

pub use aggregator::SnapshotAggregator;
pub use batch::{BatchExt, Batched};
