//! Session layer for the TIC protocol
//!
//! This crate turns raw transport chunks into validated measurements:
//! STX/ETX frame reassembly, dataset line splitting, and per-line checksum
//! validation, with observability counters for every rejection path.

pub mod historic;

pub use historic::*;
pub use teleinfo_core::{TicError, TicResult};
