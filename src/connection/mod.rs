//! Transport connection management
//!
//! [`ConnectionManager`] owns the socket lifecycle: it opens providers through a
//! [`Connector`](crate::provider::Connector), forwards their bytes to a
//! [`ChunkSink`], and reconnects with [`Backoff`] when the link drops.

mod backoff;
mod manager;

pub use backoff::Backoff;
pub use manager::ConnectionManager;

use crate::PipelineError;

/// Receives everything a session observes. Implementations must not block.
#[async_trait::async_trait]
pub trait ChunkSink: Send + 'static {
    /// Raw bytes in arrival order.
    async fn on_chunk(&mut self, chunk: &[u8]);

    /// A connect attempt is about to start.
    fn on_attempt(&mut self) {}

    /// The provider went away; any partially received sentence is garbage now.
    fn on_link_lost(&mut self) {}

    /// A connect attempt failed or an open link broke.
    fn on_error(&mut self, _error: PipelineError) {}
}
