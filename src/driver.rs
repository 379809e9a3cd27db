//! Driver tasks that turn received bytes into published snapshots
//!
//! Two halves:
//! - [`SentenceIngest`] runs inside the connection session. It frames and parses
//!   every chunk and forwards readings over a bounded channel.
//! - [`Driver::spawn_aggregator`] owns the receiving end, batches readings per
//!   window and publishes each snapshot on a watch channel.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::PipelineError;
use crate::connection::ChunkSink;
use crate::interfaces::SnapshotCache;
use crate::nmea::{ParseOutcome, SentenceFramer, parse_sentence};
use crate::stream::BatchExt;
use crate::types::{AggregatedSnapshot, ParsedReading, PipelineCounters};

/// Fans an error out to subscribers and records it as the last error.
#[derive(Clone)]
pub(crate) struct ErrorReporter {
    events: broadcast::Sender<PipelineError>,
    last: Arc<watch::Sender<Option<PipelineError>>>,
}

impl ErrorReporter {
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        let (last, _) = watch::channel(None);
        Self { events, last: Arc::new(last) }
    }

    pub fn report(&self, error: PipelineError) {
        self.last.send_replace(Some(error.clone()));
        // No subscribers is fine
        let _ = self.events.send(error);
    }

    pub fn last(&self) -> Option<PipelineError> {
        self.last.borrow().clone()
    }

    pub fn clear(&self) {
        self.last.send_replace(None);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineError> {
        self.events.subscribe()
    }
}

/// Session-side half of the driver: framer, parser and counters.
///
/// One instance per `connect()`; the framer is reset whenever the link drops so a
/// partial line from the old socket never merges with bytes from the new one.
pub(crate) struct SentenceIngest {
    framer: SentenceFramer,
    readings: mpsc::Sender<ParsedReading>,
    errors: ErrorReporter,
    counters: Arc<PipelineCounters>,
}

impl SentenceIngest {
    pub fn new(
        framer: SentenceFramer,
        readings: mpsc::Sender<ParsedReading>,
        errors: ErrorReporter,
        counters: Arc<PipelineCounters>,
    ) -> Self {
        Self { framer, readings, errors, counters }
    }

    fn handle_failure(&self, error: PipelineError) {
        match &error {
            PipelineError::ChecksumMismatch { .. } => {
                PipelineCounters::bump(&self.counters.checksum_failures)
            }
            _ => PipelineCounters::bump(&self.counters.parse_failures),
        }
        warn!("Dropping sentence: {}", error);
        self.errors.report(error);
    }
}

#[async_trait::async_trait]
impl ChunkSink for SentenceIngest {
    async fn on_chunk(&mut self, chunk: &[u8]) {
        PipelineCounters::add(&self.counters.bytes_received, chunk.len() as u64);
        trace!(bytes = chunk.len(), "Chunk received");

        let framed = self.framer.push(chunk);
        if let Some(discarded) = framed.overflow {
            PipelineCounters::bump(&self.counters.buffer_overflows);
            self.errors.report(PipelineError::BufferOverflow { discarded });
        }

        for sentence in framed.sentences {
            PipelineCounters::bump(&self.counters.sentences_framed);

            match parse_sentence(&sentence) {
                Ok(ParseOutcome::Reading(reading)) => {
                    PipelineCounters::bump(&self.counters.readings_parsed);
                    trace!(kind = ?reading.kind(), "Reading parsed");
                    // Bounded: a slow aggregator throttles socket reads
                    if self.readings.send(reading).await.is_err() {
                        debug!("Aggregator gone, discarding remaining sentences");
                        return;
                    }
                }
                Ok(ParseOutcome::Unrecognized { identifier }) => {
                    PipelineCounters::bump(&self.counters.unrecognized_sentences);
                    debug!(identifier = %identifier, "Skipping sentence");
                }
                Err(e) => self.handle_failure(e),
            }
        }
    }

    fn on_attempt(&mut self) {
        PipelineCounters::bump(&self.counters.connection_attempts);
    }

    fn on_link_lost(&mut self) {
        if self.framer.buffered() > 0 {
            debug!(bytes = self.framer.buffered(), "Discarding partial sentence after link loss");
        }
        self.framer.reset();
    }

    fn on_error(&mut self, error: PipelineError) {
        self.errors.report(error);
    }
}

/// Spawns the long-lived driver tasks.
pub(crate) struct Driver;

impl Driver {
    /// Batch readings from `readings` and publish a snapshot per window.
    ///
    /// Runs until `cancel` fires or every reading sender is dropped. The aggregator
    /// draft persists across connections so a reconnect keeps last-known values.
    pub fn spawn_aggregator(
        readings: mpsc::Receiver<ParsedReading>,
        window: Duration,
        snapshot_tx: watch::Sender<Option<Arc<AggregatedSnapshot>>>,
        cache: Option<Arc<dyn SnapshotCache>>,
        counters: Arc<PipelineCounters>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(?window, "Aggregator task started");
            let mut batches = ReceiverStream::new(readings).batched(window);

            loop {
                let next = tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Aggregator cancelled");
                        break;
                    }
                    next = batches.next() => next,
                };

                let Some(snapshot) = next else {
                    debug!("Reading channel closed");
                    break;
                };

                if let Some(cache) = &cache {
                    cache.store(&snapshot);
                }
                PipelineCounters::bump(&counters.snapshots_published);
                trace!(timestamp = %snapshot.timestamp, "Snapshot published");
                snapshot_tx.send_replace(Some(snapshot));
            }

            info!("Aggregator task ended");
        })
    }
}
