//! Collaborator contracts: where configuration comes from and where snapshots go

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use crate::types::{AggregatedSnapshot, ConnectionConfig};
use crate::{PipelineError, Result};

/// Supplies the connection parameters for `connect_from`.
pub trait ConfigSource: Send + Sync {
    fn connection_config(&self) -> Result<ConnectionConfig>;
}

impl ConfigSource for ConnectionConfig {
    fn connection_config(&self) -> Result<ConnectionConfig> {
        Ok(self.clone())
    }
}

/// Loads a [`ConnectionConfig`] from a YAML file on every call.
///
/// ```yaml
/// transport: tcp
/// host: 192.168.4.1
/// port: 10110
/// connect_timeout_ms: 10000
/// auto_reconnect: true
/// ```
///
/// Missing keys fall back to [`ConnectionConfig::default`].
#[derive(Debug, Clone)]
pub struct YamlConfigSource {
    path: PathBuf,
}

impl YamlConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for YamlConfigSource {
    fn connection_config(&self) -> Result<ConnectionConfig> {
        let yaml = std::fs::read_to_string(&self.path).map_err(|e| PipelineError::Config {
            details: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        debug!(path = %self.path.display(), "Loaded connection config");
        ConnectionConfig::from_yaml(&yaml)
    }
}

/// Push-only sink for published snapshots, e.g. a "last known position" store.
///
/// Called from the aggregator task once per published snapshot; implementations
/// must return quickly.
pub trait SnapshotCache: Send + Sync {
    fn store(&self, snapshot: &AggregatedSnapshot);
}

/// Keeps only the most recent snapshot in memory.
#[derive(Debug, Default, Clone)]
pub struct LatestSnapshotCache {
    latest: Arc<Mutex<Option<AggregatedSnapshot>>>,
}

impl LatestSnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<AggregatedSnapshot> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SnapshotCache for LatestSnapshotCache {
    fn store(&self, snapshot: &AggregatedSnapshot) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
    }
}
