//! Socket connector selecting TCP or UDP from the configuration

use tracing::debug;

use super::{TcpProvider, UdpProvider};
use crate::Result;
use crate::provider::{Connector, Provider};
use crate::types::{ConnectionConfig, TransportKind};

/// Default connector: TCP client or UDP listener per [`ConnectionConfig::transport`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SocketConnector;

#[async_trait::async_trait]
impl Connector for SocketConnector {
    async fn open(&self, config: &ConnectionConfig) -> Result<Box<dyn Provider>> {
        debug!(transport = ?config.transport, address = %config.address(), "Opening socket");
        match config.transport {
            TransportKind::Tcp => {
                Ok(Box::new(TcpProvider::connect(&config.host, config.port).await?))
            }
            TransportKind::Udp => Ok(Box::new(UdpProvider::bind(&config.host, config.port).await?)),
        }
    }
}
