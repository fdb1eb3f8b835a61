//! Transport adapters for TIC streams
//!
//! This crate owns the receive side of the pipeline: a push-only chunk
//! source trait plus UDP listener and serial port implementations. Transport
//! reliability is explicitly out of scope — the protocol layer upstream is
//! built to survive loss and reordering, not to fix it.

pub mod serial;
pub mod source;
pub mod udp;

pub use serial::{SerialChunkSource, SerialSettings, DEFAULT_BAUD_RATE};
pub use source::{ChunkListener, ChunkSource};
pub use udp::{UdpChunkSource, UdpListenerSettings, DEFAULT_PORT, MAX_UDP_PAYLOAD_SIZE};
