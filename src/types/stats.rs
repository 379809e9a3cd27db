//! Ingestion counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the pipeline counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub bytes_received: u64,
    pub sentences_framed: u64,
    pub readings_parsed: u64,
    pub checksum_failures: u64,
    pub parse_failures: u64,
    pub unrecognized_sentences: u64,
    pub buffer_overflows: u64,
    pub snapshots_published: u64,
    pub connection_attempts: u64,
}

/// Shared counters updated from the worker tasks.
#[derive(Debug, Default)]
pub(crate) struct PipelineCounters {
    pub bytes_received: AtomicU64,
    pub sentences_framed: AtomicU64,
    pub readings_parsed: AtomicU64,
    pub checksum_failures: AtomicU64,
    pub parse_failures: AtomicU64,
    pub unrecognized_sentences: AtomicU64,
    pub buffer_overflows: AtomicU64,
    pub snapshots_published: AtomicU64,
    pub connection_attempts: AtomicU64,
}

impl PipelineCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU64, amount: u64) {
        counter.fetch_add(amount, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipelineStats {
        PipelineStats {
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            sentences_framed: self.sentences_framed.load(Ordering::Relaxed),
            readings_parsed: self.readings_parsed.load(Ordering::Relaxed),
            checksum_failures: self.checksum_failures.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            unrecognized_sentences: self.unrecognized_sentences.load(Ordering::Relaxed),
            buffer_overflows: self.buffer_overflows.load(Ordering::Relaxed),
            snapshots_published: self.snapshots_published.load(Ordering::Relaxed),
            connection_attempts: self.connection_attempts.load(Ordering::Relaxed),
        }
    }
}
