//! Core types for the TIC (Tele-Information Client) protocol
//!
//! This crate provides the error type, wire-format constants, and the data
//! model shared by the other teleinfo crates.

pub mod constants;
pub mod error;
pub mod measurement;

pub use error::{TicError, TicResult};
pub use measurement::{RejectReason, RejectedLine, ValidatedMeasurement};
