//! Connection state machine states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Health of the instrument link, as published by the connection manager.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Waiting out a backoff delay before the next attempt
    Reconnecting,
    /// Last attempt failed or the link dropped.
    ///
    /// Terminal only without `auto_reconnect`. Otherwise it is followed at once
    /// by `Reconnecting` and the failure stays readable as the pipeline's last error.
    Error(String),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    /// Connecting, connected, or retrying.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Connected | ConnectionState::Reconnecting
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("Disconnected"),
            ConnectionState::Connecting => f.write_str("Connecting…"),
            ConnectionState::Connected => f.write_str("Connected"),
            ConnectionState::Reconnecting => f.write_str("Reconnecting…"),
            ConnectionState::Error(reason) => write!(f, "Error: {reason}"),
        }
    }
}
