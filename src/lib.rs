//! NMEA 0183 ingestion for marine instrument gateways.
//!
//! SailStream connects to an NMEA-over-IP gateway (TCP or UDP), validates and
//! decodes the sentences it streams, and republishes an aggregated "latest
//! readings" snapshot at a bounded rate.
//!
//! # Features
//!
//! - **Transports**: TCP client and UDP listener, plus log replay
//! - **Sentences**: GGA, RMC, VTG, MWV, DPT and DBT from any talker
//! - **Resilience**: checksum validation, framing resync, reconnect with backoff
//! - **Bounded updates**: one snapshot per 200 ms window, only when something changed
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use sailstream::{ConnectionConfig, SailStream};
//!
//! #[tokio::main]
//! async fn main() -> sailstream::Result<()> {
//!     let pipeline = SailStream::connect(ConnectionConfig::tcp("192.168.4.1", 10110)).await?;
//!     let mut snapshots = pipeline.snapshot_updates().boxed();
//!
//!     while let Some(snapshot) = snapshots.next().await {
//!         if let Some((lat, lon)) = snapshot.latest_position() {
//!             println!("{lat:.5}, {lon:.5}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod driver;
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

pub mod connection;
pub mod interfaces;
pub mod nmea;
pub mod pipeline;
pub mod provider;
pub mod providers;
pub mod stream;

pub use error::*;
pub use types::*;

pub use interfaces::{ConfigSource, LatestSnapshotCache, SnapshotCache, YamlConfigSource};
pub use pipeline::{NmeaPipeline, PipelineBuilder, PipelineOptions};

use std::path::Path;
use std::sync::Arc;

use providers::ReplayConnector;

/// Lines per second used by [`SailStream::replay`].
pub const DEFAULT_REPLAY_RATE_HZ: f64 = 10.0;

/// Entry point for the common cases.
///
/// For a custom connector, cache or options use [`NmeaPipeline::builder`].
pub struct SailStream;

impl SailStream {
    /// Create a pipeline and connect it to a live gateway.
    ///
    /// Returns once the first connect attempt has finished. If it failed, the
    /// pipeline is still returned: check [`NmeaPipeline::connection_state`] and
    /// rely on `auto_reconnect` to retry.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidConfig`] if `config` fails validation.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use sailstream::{ConnectionConfig, SailStream};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> sailstream::Result<()> {
    /// let pipeline = SailStream::connect(ConnectionConfig::udp("0.0.0.0", 10110)).await?;
    /// println!("{}", pipeline.connection_state());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(config: ConnectionConfig) -> Result<NmeaPipeline> {
        let pipeline = NmeaPipeline::new();
        pipeline.connect(config).await?;
        Ok(pipeline)
    }

    /// Replay a recorded NMEA log at [`DEFAULT_REPLAY_RATE_HZ`] lines per second.
    ///
    /// The log is played once; when it ends the connection state becomes
    /// [`ConnectionState::Error`] and the last snapshot stays available.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use sailstream::SailStream;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> sailstream::Result<()> {
    /// let pipeline = SailStream::replay("passage.nmea").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn replay<P: AsRef<Path>>(path: P) -> Result<NmeaPipeline> {
        let path = path.as_ref();
        let pipeline = NmeaPipeline::builder()
            .connector(Arc::new(ReplayConnector::from_file(path, DEFAULT_REPLAY_RATE_HZ)))
            .build();

        let config = ConnectionConfig::tcp(path.display().to_string(), DEFAULT_NMEA_PORT)
            .with_auto_reconnect(false);
        pipeline.connect(config).await?;
        Ok(pipeline)
    }
}
