//! Last-write-wins snapshot aggregation

use chrono::Utc;
use std::sync::Arc;

use crate::types::{AggregatedSnapshot, ParsedReading};

/// Merges readings into a draft snapshot and publishes it on demand.
///
/// Each reading overwrites only its own slot. The draft carries forward across
/// flushes, so a slot stays filled until a newer reading of that kind arrives.
#[derive(Debug, Default)]
pub struct SnapshotAggregator {
    draft: AggregatedSnapshot,
    dirty: bool,
}

impl SnapshotAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a previously published snapshot.
    pub fn seeded(snapshot: AggregatedSnapshot) -> Self {
        Self { draft: snapshot, dirty: false }
    }

    pub fn ingest(&mut self, reading: ParsedReading) {
        self.draft.apply(reading);
        self.dirty = true;
    }

    /// Whether anything changed since the last flush.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Publish the draft if it changed since the last flush.
    pub fn flush(&mut self) -> Option<Arc<AggregatedSnapshot>> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        self.draft.timestamp = Utc::now();
        Some(Arc::new(self.draft.clone()))
    }
}
