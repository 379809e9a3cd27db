//! UDP listener provider

use tokio::net::UdpSocket;
use tracing::{info, trace};

use crate::Result;
use crate::provider::Provider;

/// Largest datagram accepted; NMEA gateways send one or a few sentences per packet.
const MAX_DATAGRAM_SIZE: usize = 65_507;

/// UDP socket bound to receive broadcast NMEA datagrams
pub struct UdpProvider {
    socket: UdpSocket,
    local: String,
    buffer: Box<[u8]>,
}

impl UdpProvider {
    /// Bind to `host:port`. Use `0.0.0.0` to listen on every interface.
    pub async fn bind(host: &str, port: u16) -> Result<Self> {
        let socket = UdpSocket::bind((host, port)).await?;
        let local = socket.local_addr()?.to_string();
        info!(local = %local, "UDP listener bound");
        Ok(Self { socket, local, buffer: vec![0u8; MAX_DATAGRAM_SIZE].into_boxed_slice() })
    }

    /// Address actually bound, useful when binding to port 0.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

#[async_trait::async_trait]
impl Provider for UdpProvider {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            let (received, from) = self.socket.recv_from(&mut self.buffer).await?;
            if received == 0 {
                continue;
            }
            trace!(from = %from, bytes = received, "UDP datagram");
            return Ok(Some(self.buffer[..received].to_vec()));
        }
    }

    fn describe(&self) -> String {
        format!("udp://{}", self.local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receives_datagrams() {
        let mut provider = UdpProvider::bind("127.0.0.1", 0).await.unwrap();
        let target = provider.local_addr().unwrap();

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.send_to(b"$WIMWV,214.8,R,0.1,K,A*28\r\n", target).await.unwrap();

        let chunk = provider.next_chunk().await.unwrap().expect("datagram");
        assert_eq!(chunk, b"$WIMWV,214.8,R,0.1,K,A*28\r\n");
        assert!(provider.describe().starts_with("udp://127.0.0.1"));
    }
}
