use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// A single validated (label, value) observation
///
/// Produced by the protocol layer once a dataset line has passed checksum
/// validation. Immutable once constructed; `observed_at` is the time the
/// enclosing frame was received, not the time the line was parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedMeasurement {
    label: String,
    value: String,
    observed_at: SystemTime,
}

impl ValidatedMeasurement {
    /// Create a new validated measurement
    pub fn new(label: String, value: String, observed_at: SystemTime) -> Self {
        Self {
            label,
            value,
            observed_at,
        }
    }

    /// Get the measurement label (e.g. "PAPP", "BASE")
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get the measurement value as transmitted by the meter
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Get the time the enclosing frame was received
    pub fn observed_at(&self) -> SystemTime {
        self.observed_at
    }
}

impl fmt::Display for ValidatedMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.label, self.value)
    }
}

/// Why a dataset line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The recomputed checksum does not match the trailing checksum byte
    ChecksumMismatch,
    /// The line does not split into a label/value/checksum shape
    Unparseable,
}

impl RejectReason {
    /// Get human-readable reason name
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::ChecksumMismatch => "ChecksumMismatch",
            RejectReason::Unparseable => "Unparseable",
        }
    }
}

/// A dataset line that failed validation
///
/// The original line bytes are retained for diagnostics; rejected lines are
/// never corrected or retried at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedLine {
    reason: RejectReason,
    #[serde(with = "serde_bytes")]
    raw: Vec<u8>,
}

impl RejectedLine {
    /// Create a new rejected line record
    pub fn new(reason: RejectReason, raw: Vec<u8>) -> Self {
        Self { reason, raw }
    }

    /// Get the rejection reason
    pub fn reason(&self) -> RejectReason {
        self.reason
    }

    /// Get the original line bytes
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

impl fmt::Display for RejectedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:?}",
            self.reason.as_str(),
            String::from_utf8_lossy(&self.raw)
        )
    }
}
