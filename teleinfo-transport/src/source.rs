//! Chunk source traits for the transport adapter

use async_trait::async_trait;
use bytes::Bytes;
use teleinfo_core::TicResult;

/// Push-only source of raw byte chunks from a meter stream
///
/// Implementations own the blocking/async receive; the protocol layer only
/// ever sees already-received bytes. Chunk boundaries carry no meaning: a
/// chunk may contain zero, one, or many frame fragments, and one frame may
/// span several chunks.
#[async_trait]
pub trait ChunkSource: Send + Sync {
    /// Receive the next raw chunk
    async fn recv(&mut self) -> TicResult<Bytes>;

    /// Check if the source is closed
    fn is_closed(&self) -> bool;

    /// Close the source
    async fn close(&mut self) -> TicResult<()>;
}

/// Chunk source trait that extends ChunkSource with explicit opening
#[async_trait]
pub trait ChunkListener: ChunkSource {
    /// Open the underlying socket or port
    async fn open(&mut self) -> TicResult<()>;
}
