//! Label value store for TIC measurements
//!
//! Keeps the most recently observed value per label and detects changes so
//! consumers only re-publish when a value actually moved.

pub mod events;
pub mod store;

pub use events::{ChangeEvent, ChangeOutcome};
pub use store::LabelValueStore;
