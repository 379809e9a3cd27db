//! Replay provider for recorded NMEA logs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::provider::{Connector, Provider};
use crate::types::ConnectionConfig;
use crate::{PipelineError, Result};

/// Replays a recorded log one line per tick, then reports the link as closed.
pub struct ReplayProvider {
    /// Whole log, shared between reconnects
    data: Arc<[u8]>,

    /// Offset of the next unsent byte
    position: usize,

    /// Line pacing
    interval: Interval,

    /// Lines per second
    rate_hz: f64,
}

impl ReplayProvider {
    /// Replay `data` at `rate_hz` lines per second.
    pub fn from_bytes(data: impl Into<Arc<[u8]>>, rate_hz: f64) -> Self {
        let rate_hz = rate_hz.clamp(0.1, 10_000.0);
        let mut interval = interval(Duration::from_secs_f64(1.0 / rate_hz));
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        Self { data: data.into(), position: 0, interval, rate_hz }
    }

    /// Load a log file and replay it at `rate_hz` lines per second.
    pub async fn open<P: AsRef<Path>>(path: P, rate_hz: f64) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|e| {
            PipelineError::connection_failed(format!("cannot read log {}: {e}", path.display()))
        })?;
        info!("Opened NMEA log {}: {} bytes at {}Hz", path.display(), data.len(), rate_hz);
        Ok(Self::from_bytes(data, rate_hz))
    }

    /// Fraction of the log already sent, 0.0 to 1.0.
    pub fn progress(&self) -> f64 {
        if self.data.is_empty() { 1.0 } else { self.position as f64 / self.data.len() as f64 }
    }

    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }
}

#[async_trait::async_trait]
impl Provider for ReplayProvider {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if self.position >= self.data.len() {
            debug!("Reached end of replay");
            return Ok(None);
        }

        self.interval.tick().await;

        let rest = &self.data[self.position..];
        let line_len = rest.iter().position(|b| *b == b'\n').map(|i| i + 1).unwrap_or(rest.len());
        let chunk = rest[..line_len].to_vec();
        self.position += line_len;

        trace!(position = self.position, total = self.data.len(), "Replay chunk");
        Ok(Some(chunk))
    }

    fn describe(&self) -> String {
        format!("replay ({} bytes at {}Hz)", self.data.len(), self.rate_hz)
    }
}

/// Where a [`ReplayConnector`] gets its log from.
#[derive(Debug, Clone)]
pub enum ReplaySource {
    Bytes(Arc<[u8]>),
    File(PathBuf),
}

/// Connector that replays a recorded log instead of opening a socket.
///
/// The configuration's host and port are ignored. Each connect starts the log from
/// the beginning, so with `auto_reconnect` the log loops after a backoff delay.
#[derive(Debug, Clone)]
pub struct ReplayConnector {
    source: ReplaySource,
    rate_hz: f64,
}

impl ReplayConnector {
    pub fn from_bytes(data: impl Into<Arc<[u8]>>, rate_hz: f64) -> Self {
        Self { source: ReplaySource::Bytes(data.into()), rate_hz }
    }

    pub fn from_file(path: impl Into<PathBuf>, rate_hz: f64) -> Self {
        Self { source: ReplaySource::File(path.into()), rate_hz }
    }
}

#[async_trait::async_trait]
impl Connector for ReplayConnector {
    async fn open(&self, _config: &ConnectionConfig) -> Result<Box<dyn Provider>> {
        let provider = match &self.source {
            ReplaySource::Bytes(data) => ReplayProvider::from_bytes(Arc::clone(data), self.rate_hz),
            ReplaySource::File(path) => ReplayProvider::open(path, self.rate_hz).await?,
        };
        Ok(Box::new(provider))
    }
}
