//! Processing pipeline for TIC streams
//!
//! Wires a chunk source through frame reassembly, decoding, and the label
//! value store, and exposes the change event stream and observability
//! counters a publisher consumes.

pub mod pipeline;

pub use pipeline::TicPipeline;
