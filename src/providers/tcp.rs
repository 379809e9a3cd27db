//! TCP client provider

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tracing::{debug, info, trace};

use crate::Result;
use crate::provider::Provider;

const READ_BUFFER_SIZE: usize = 4096;

/// Long-lived TCP connection to an NMEA gateway
pub struct TcpProvider {
    stream: TcpStream,
    peer: String,
    buffer: Box<[u8]>,
}

impl TcpProvider {
    /// Connect to `host:port`. Timeouts are applied by the caller.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        debug!(host, port, "Opening TCP connection");
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| format!("{host}:{port}"));
        info!(peer = %peer, "TCP connection established");
        Ok(Self::from_stream(stream, peer))
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream, peer: String) -> Self {
        Self { stream, peer, buffer: vec![0u8; READ_BUFFER_SIZE].into_boxed_slice() }
    }
}

#[async_trait::async_trait]
impl Provider for TcpProvider {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let read = self.stream.read(&mut self.buffer).await?;
        if read == 0 {
            debug!(peer = %self.peer, "TCP peer closed the connection");
            return Ok(None);
        }
        trace!(peer = %self.peer, bytes = read, "TCP chunk");
        Ok(Some(self.buffer[..read].to_vec()))
    }

    fn describe(&self) -> String {
        format!("tcp://{}", self.peer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn reads_chunks_until_peer_closes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"$SDDPT,2.4,0.5,*78\r\n").await.unwrap();
        });

        let mut provider = TcpProvider::connect("127.0.0.1", port).await.unwrap();
        assert!(provider.describe().starts_with("tcp://127.0.0.1"));

        let mut received = Vec::new();
        while let Some(chunk) = provider.next_chunk().await.unwrap() {
            received.extend(chunk);
        }
        assert_eq!(received, b"$SDDPT,2.4,0.5,*78\r\n");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn refused_connection_is_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = TcpProvider::connect("127.0.0.1", port).await.err().expect("nothing listening");
        assert!(matches!(err, crate::PipelineError::Connection { .. }));
    }
}
