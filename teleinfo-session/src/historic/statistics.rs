//! Protocol statistics collection

use serde::Serialize;

/// Pipeline observability counters
///
/// Tracks frame- and line-level outcomes for monitoring and debugging.
/// Counters are updated by the pipeline as input passes through and can be
/// queried at any time by a consumer; rejected input is counted here rather
/// than surfaced as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProtocolStatistics {
    /// Number of complete frames emitted by the assembler
    pub frames_accepted: u64,
    /// Number of partial frames discarded (spurious restart or buffer overrun)
    pub frames_discarded: u64,
    /// Number of dataset lines accepted after checksum validation
    pub lines_accepted: u64,
    /// Number of dataset lines rejected for a checksum mismatch
    pub lines_rejected_checksum: u64,
    /// Number of dataset lines rejected as unparseable
    pub lines_rejected_unparseable: u64,
}

impl ProtocolStatistics {
    /// Create new statistics with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all statistics counters
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Increment the accepted frame counter
    pub fn increment_frames_accepted(&mut self) {
        self.frames_accepted += 1;
    }

    /// Increment the accepted line counter
    pub fn increment_lines_accepted(&mut self) {
        self.lines_accepted += 1;
    }

    /// Increment the checksum rejection counter
    pub fn increment_lines_rejected_checksum(&mut self) {
        self.lines_rejected_checksum += 1;
    }

    /// Increment the unparseable rejection counter
    pub fn increment_lines_rejected_unparseable(&mut self) {
        self.lines_rejected_unparseable += 1;
    }

    /// Get the total number of rejected lines
    pub fn lines_rejected(&self) -> u64 {
        self.lines_rejected_checksum + self.lines_rejected_unparseable
    }

    /// Get the line rejection rate as a percentage
    ///
    /// Returns 0.0 if no lines have been seen.
    pub fn rejection_rate(&self) -> f64 {
        let total = self.lines_accepted + self.lines_rejected();
        if total == 0 {
            0.0
        } else {
            (self.lines_rejected() as f64 / total as f64) * 100.0
        }
    }
}
