//! Data pipeline facade
//!
//! [`NmeaPipeline`] is the one object consumers hold. It owns the connection
//! manager and the aggregator task, and exposes the latest snapshot, link state,
//! errors and counters both as synchronous reads and as streams.

use futures::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::connection::ConnectionManager;
use crate::driver::{Driver, ErrorReporter, SentenceIngest};
use crate::interfaces::{ConfigSource, SnapshotCache};
use crate::nmea::{DEFAULT_BUFFER_CAPACITY, SentenceFramer};
use crate::provider::Connector;
use crate::providers::SocketConnector;
use crate::types::{
    AggregatedSnapshot, ConnectionConfig, ConnectionState, ParsedReading, PipelineCounters,
    PipelineStats,
};
use crate::{PipelineError, Result};

/// Tuning knobs for a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Snapshot emission window
    pub batch_window: Duration,
    /// Framer cap on bytes held without a line terminator
    pub framer_capacity: usize,
    /// Readings buffered between the session and the aggregator
    pub reading_channel_capacity: usize,
    /// Errors buffered per error subscriber before the oldest are dropped
    pub error_channel_capacity: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            batch_window: Duration::from_millis(200),
            framer_capacity: DEFAULT_BUFFER_CAPACITY,
            reading_channel_capacity: 256,
            error_channel_capacity: 64,
        }
    }
}

/// Assembles an [`NmeaPipeline`] with a custom connector, cache or options.
#[derive(Default)]
pub struct PipelineBuilder {
    options: PipelineOptions,
    connector: Option<Arc<dyn Connector>>,
    cache: Option<Arc<dyn SnapshotCache>>,
}

impl PipelineBuilder {
    pub fn options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn batch_window(mut self, window: Duration) -> Self {
        self.options.batch_window = window;
        self
    }

    /// Replace the socket connector, e.g. with a `ReplayConnector`.
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Offer every published snapshot to `cache`.
    pub fn cache(mut self, cache: Arc<dyn SnapshotCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Spawn the aggregator and return the idle pipeline.
    ///
    /// Must be called within a tokio runtime.
    pub fn build(self) -> NmeaPipeline {
        let options = self.options;
        let connector = self.connector.unwrap_or_else(|| Arc::new(SocketConnector));

        let (readings_tx, readings_rx) = mpsc::channel(options.reading_channel_capacity.max(1));
        let (snapshot_tx, snapshots) = watch::channel(None);
        let counters = Arc::new(PipelineCounters::default());
        let cancel = CancellationToken::new();

        let aggregator = Driver::spawn_aggregator(
            readings_rx,
            options.batch_window,
            snapshot_tx,
            self.cache,
            Arc::clone(&counters),
            cancel.clone(),
        );

        debug!(?options, "Pipeline created");

        NmeaPipeline {
            manager: ConnectionManager::new(connector),
            errors: ErrorReporter::new(options.error_channel_capacity.max(1)),
            options,
            readings_tx,
            snapshots,
            counters,
            cancel,
            aggregator: Some(aggregator),
        }
    }
}

/// NMEA ingestion pipeline.
///
/// Bytes flow transport → framer → parser → aggregator → snapshot; commands flow
/// the other way through [`connect`](Self::connect) and
/// [`disconnect`](Self::disconnect).
///
/// The latest snapshot survives disconnects and reconnects, so consumers keep
/// showing last-known values while the link is down.
///
/// Dropping the pipeline cancels every task it started. Use
/// [`dispose`](Self::dispose) to also wait for them to finish.
pub struct NmeaPipeline {
    options: PipelineOptions,
    manager: ConnectionManager,
    readings_tx: mpsc::Sender<ParsedReading>,
    snapshots: watch::Receiver<Option<Arc<AggregatedSnapshot>>>,
    errors: ErrorReporter,
    counters: Arc<PipelineCounters>,
    cancel: CancellationToken,
    aggregator: Option<JoinHandle<()>>,
}

impl NmeaPipeline {
    /// Pipeline over real sockets with default options.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Pipeline over real sockets with custom options.
    pub fn with_options(options: PipelineOptions) -> Self {
        Self::builder().options(options).build()
    }

    /// Open a connection described by `config`.
    ///
    /// Waits until the first attempt has connected or failed. A failed attempt is
    /// not an `Err`: it shows up as [`ConnectionState::Error`], on
    /// [`error_updates`](Self::error_updates), and is retried when
    /// `auto_reconnect` is set. Calling this while a connection is active logs a
    /// warning and does nothing.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidConfig`] if `config` fails validation.
    pub async fn connect(&self, config: ConnectionConfig) -> Result<()> {
        let sink = SentenceIngest::new(
            SentenceFramer::with_capacity(self.options.framer_capacity),
            self.readings_tx.clone(),
            self.errors.clone(),
            Arc::clone(&self.counters),
        );

        if let Err(e) = self.manager.connect(config, sink).await {
            warn!("Rejected connection request: {}", e);
            self.errors.report(e.clone());
            return Err(e);
        }
        Ok(())
    }

    /// Load the configuration from `source`, then [`connect`](Self::connect).
    pub async fn connect_from(&self, source: &dyn ConfigSource) -> Result<()> {
        let config = source.connection_config().inspect_err(|e| self.errors.report(e.clone()))?;
        self.connect(config).await
    }

    /// Close the link and cancel any pending reconnect. Idempotent.
    pub async fn disconnect(&self) {
        self.manager.disconnect().await;
    }

    /// Disconnect, stop the aggregator and wait for every task to finish.
    pub async fn dispose(mut self) {
        info!("Disposing pipeline");
        self.manager.disconnect().await;
        self.cancel.cancel();

        if let Some(task) = self.aggregator.take() {
            match task.await {
                Err(e) if e.is_panic() => error!("Aggregator task panicked: {}", e),
                _ => {}
            }
        }
    }

    /// Most recent snapshot, `None` until the first window with data.
    pub fn current_snapshot(&self) -> Option<Arc<AggregatedSnapshot>> {
        self.snapshots.borrow().clone()
    }

    /// Current link state.
    ///
    /// With `auto_reconnect` a failure passes through [`ConnectionState::Error`]
    /// straight into [`ConnectionState::Reconnecting`], so the reason is read
    /// from [`last_error`](Self::last_error) rather than from the state.
    pub fn connection_state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn is_connected(&self) -> bool {
        self.manager.state().is_connected()
    }

    /// Connecting, connected or waiting to retry.
    pub fn is_active(&self) -> bool {
        self.manager.state().is_active()
    }

    /// Most recent error of any kind, until [`clear_error`](Self::clear_error).
    pub fn last_error(&self) -> Option<PipelineError> {
        self.errors.last()
    }

    pub fn clear_error(&self) {
        self.errors.clear();
    }

    pub fn stats(&self) -> PipelineStats {
        self.counters.snapshot()
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Stream of published snapshots, starting with the current one if any.
    ///
    /// Slow consumers skip intermediate snapshots rather than queueing them.
    pub fn snapshot_updates(&self) -> impl Stream<Item = Arc<AggregatedSnapshot>> + 'static {
        WatchStream::new(self.snapshots.clone()).filter_map(|opt| async move { opt })
    }

    /// Stream of errors reported after subscription.
    ///
    /// A subscriber that falls more than `error_channel_capacity` errors behind
    /// loses the oldest ones.
    pub fn error_updates(&self) -> impl Stream<Item = PipelineError> + 'static {
        BroadcastStream::new(self.errors.subscribe()).filter_map(|result| async move {
            match result {
                Ok(error) => Some(error),
                Err(lagged) => {
                    debug!("Error subscriber lagged: {}", lagged);
                    None
                }
            }
        })
    }

    /// Stream of connection states, starting with the current one.
    ///
    /// Intermediate states can be skipped by a slow reader. In particular the
    /// `Error` that precedes `Reconnecting` is usually replaced before it is
    /// seen; [`error_updates`](Self::error_updates) carries every failure.
    pub fn state_updates(&self) -> impl Stream<Item = ConnectionState> + 'static {
        WatchStream::new(self.manager.subscribe_state())
    }
}

impl Default for NmeaPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NmeaPipeline {
    fn drop(&mut self) {
        debug!("Dropping pipeline");
        self.cancel.cancel();
    }
}
