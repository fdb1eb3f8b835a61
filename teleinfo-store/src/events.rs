//! Change notifications emitted by the label value store

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Emitted when a label is first seen or its value differs from the stored one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The measurement label
    pub label: String,
    /// The previously stored value, if the label had been seen before
    pub old_value: Option<String>,
    /// The newly stored value
    pub new_value: String,
    /// Receipt time of the frame carrying the new value
    pub observed_at: SystemTime,
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.old_value {
            Some(old) => write!(f, "{}: {} -> {}", self.label, old, self.new_value),
            None => write!(f, "{}: {} (new)", self.label, self.new_value),
        }
    }
}

/// Result of applying one measurement to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The stored value changed; consumers should re-publish
    Changed(ChangeEvent),
    /// The value was identical; only the observation timestamp advanced
    Unchanged,
}

impl ChangeOutcome {
    /// Check if the outcome carries a change event
    pub fn is_change(&self) -> bool {
        matches!(self, ChangeOutcome::Changed(_))
    }
}
