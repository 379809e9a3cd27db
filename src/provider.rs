//! Provider and connector traits for byte sources

use crate::Result;
use crate::types::ConnectionConfig;

/// An open transport delivering raw NMEA bytes.
///
/// Providers only move bytes; framing and parsing happen downstream.
#[async_trait::async_trait]
pub trait Provider: Send + 'static {
    /// Wait for the next chunk of bytes.
    ///
    /// Returns:
    /// - `Ok(Some(bytes))` - Data arrived (never empty)
    /// - `Ok(None)` - The peer closed the link
    /// - `Err(e)` - The link failed
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>>;

    /// Human readable endpoint description for logs
    fn describe(&self) -> String;
}

/// Opens providers for a configuration.
///
/// The connection manager calls [`Connector::open`] once per attempt and bounds it
/// with the configured connect timeout.
#[async_trait::async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn open(&self, config: &ConnectionConfig) -> Result<Box<dyn Provider>>;
}
