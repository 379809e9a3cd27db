//! Connection configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{PipelineError, Result};

/// Transport used to reach the instrument gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Long-lived TCP client connection to `host:port`
    #[default]
    Tcp,
    /// UDP socket bound to `host:port`, receiving broadcast datagrams
    Udp,
}

/// Parameters for one connection.
///
/// Immutable once handed to `connect()`; build a new value to change settings.
///
/// Durations serialize as milliseconds:
///
/// ```rust
/// use sailstream::{ConnectionConfig, TransportKind};
///
/// let config: ConnectionConfig = serde_yaml_ng::from_str(
///     "transport: udp\nhost: 0.0.0.0\nport: 10110\nconnect_timeout_ms: 2500\n",
/// ).unwrap();
/// assert_eq!(config.transport, TransportKind::Udp);
/// assert_eq!(config.connect_timeout.as_millis(), 2500);
/// assert!(config.auto_reconnect);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub transport: TransportKind,
    pub host: String,
    pub port: u16,
    #[serde(rename = "connect_timeout_ms", with = "millis")]
    pub connect_timeout: Duration,
    #[serde(rename = "reconnect_base_delay_ms", with = "millis")]
    pub reconnect_base_delay: Duration,
    #[serde(rename = "max_reconnect_delay_ms", with = "millis")]
    pub max_reconnect_delay: Duration,
    pub auto_reconnect: bool,
}

/// Default NMEA-over-IP port used by most gateways.
pub const DEFAULT_NMEA_PORT: u16 = 10110;

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Tcp,
            host: "192.168.4.1".to_string(),
            port: DEFAULT_NMEA_PORT,
            connect_timeout: Duration::from_secs(10),
            reconnect_base_delay: Duration::from_secs(5),
            max_reconnect_delay: Duration::from_secs(30),
            auto_reconnect: true,
        }
    }
}

impl ConnectionConfig {
    /// TCP client configuration with default timeouts.
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self { transport: TransportKind::Tcp, host: host.into(), port, ..Self::default() }
    }

    /// UDP listener configuration with default timeouts.
    pub fn udp(host: impl Into<String>, port: u16) -> Self {
        Self { transport: TransportKind::Udp, host: host.into(), port, ..Self::default() }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_auto_reconnect(mut self, auto_reconnect: bool) -> Self {
        self.auto_reconnect = auto_reconnect;
        self
    }

    pub fn with_reconnect_delays(mut self, base: Duration, max: Duration) -> Self {
        self.reconnect_base_delay = base;
        self.max_reconnect_delay = max;
        self
    }

    /// `host:port`, for logging and socket addressing.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Basic range checks. Anything failing here is a caller bug.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(PipelineError::invalid_config("host must not be empty"));
        }
        if self.port == 0 {
            return Err(PipelineError::invalid_config("port must be between 1 and 65535"));
        }
        if self.connect_timeout.is_zero() {
            return Err(PipelineError::invalid_config("connect timeout must be non-zero"));
        }
        if self.reconnect_base_delay.is_zero() {
            return Err(PipelineError::invalid_config("reconnect base delay must be non-zero"));
        }
        if self.max_reconnect_delay < self.reconnect_base_delay {
            return Err(PipelineError::invalid_config(
                "max reconnect delay must not be shorter than the base delay",
            ));
        }
        Ok(())
    }

    /// Parse a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ConnectionConfig = serde_yaml_ng::from_str(yaml)?;
        Ok(config)
    }

    /// Render this configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
