//! Time-window batching of readings into snapshots

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use super::SnapshotAggregator;
use crate::types::{AggregatedSnapshot, ParsedReading};

/// Extension trait to batch a stream of readings into snapshots.
pub trait BatchExt: Stream<Item = ParsedReading> {
    /// Emit at most one snapshot per `window`.
    ///
    /// Readings arriving within a window are merged last-write-wins; a window
    /// with no readings emits nothing. When the inner stream ends, any pending
    /// changes are flushed immediately.
    fn batched(self, window: Duration) -> Batched<Self>
    where
        Self: Sized,
    {
        Batched::new(self, window)
    }
}

impl<T: Stream<Item = ParsedReading>> BatchExt for T {}

pin_project! {
    /// Stream combinator produced by [`BatchExt::batched`].
    pub struct Batched<S> {
        #[pin]
        stream: S,
        interval: Interval,
        aggregator: SnapshotAggregator,
        done: bool,
    }
}

impl<S: Stream<Item = ParsedReading>> Batched<S> {
    pub fn new(stream: S, window: Duration) -> Self {
        Self::with_aggregator(stream, window, SnapshotAggregator::new())
    }

    /// Continue from an existing aggregator, e.g. one seeded with the last snapshot.
    pub fn with_aggregator(stream: S, window: Duration, aggregator: SnapshotAggregator) -> Self {
        // First tick one full window out, so the first batch is not emitted early
        let mut interval = interval_at(Instant::now() + window, window);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self { stream, interval, aggregator, done: false }
    }
}

impl<S: Stream<Item = ParsedReading>> Stream for Batched<S> {
    type Item = Arc<AggregatedSnapshot>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            // Drain everything available into the draft
            while !*this.done {
                match this.stream.as_mut().poll_next(cx) {
                    Poll::Ready(Some(reading)) => this.aggregator.ingest(reading),
                    Poll::Ready(None) => *this.done = true,
                    Poll::Pending => break,
                }
            }

            if *this.done {
                return Poll::Ready(this.aggregator.flush());
            }

            ready!(this.interval.poll_tick(cx));

            if let Some(snapshot) = this.aggregator.flush() {
                return Poll::Ready(Some(snapshot));
            }
        }
    }
}
