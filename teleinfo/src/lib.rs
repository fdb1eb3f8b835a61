//! teleinfo - Rust implementation of the Linky TIC protocol (Historic Mode)
//!
//! This library turns the raw Tele-Information Client byte stream a utility
//! smart meter emits - pushed over an unreliable datagram transport or read
//! from the meter's serial output - into validated, typed (label, value)
//! measurements with change detection.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `teleinfo-core`: Core types, error handling, and wire constants
//! - `teleinfo-session`: Historic Mode framing, line parsing, checksums
//! - `teleinfo-store`: Label value store with change detection
//! - `teleinfo-transport`: Transport adapters (UDP listener, Serial)
//! - `teleinfo-pipeline`: End-to-end processing pipeline
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use teleinfo::pipeline::TicPipeline;
//! use teleinfo::store::LabelValueStore;
//! use teleinfo::transport::{ChunkListener, UdpChunkSource, UdpListenerSettings};
//!
//! # async fn run() -> teleinfo::TicResult<()> {
//! let store = Arc::new(LabelValueStore::new());
//! let (mut pipeline, mut events) = TicPipeline::new(store.clone());
//!
//! let mut source = UdpChunkSource::new(UdpListenerSettings::default());
//! source.open().await?;
//!
//! tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         println!("{}", event);
//!     }
//! });
//!
//! pipeline.run(&mut source).await
//! # }
//! ```

// Re-export core types
pub use teleinfo_core::{RejectReason, RejectedLine, TicError, TicResult, ValidatedMeasurement};

// Re-export the session layer API
pub mod session {
    pub use teleinfo_session::*;
}

// Re-export the store API
pub mod store {
    pub use teleinfo_store::*;
}

// Re-export the transport API
pub mod transport {
    pub use teleinfo_transport::*;
}

// Re-export the pipeline API
pub mod pipeline {
    pub use teleinfo_pipeline::*;
}
