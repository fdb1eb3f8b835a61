//! Frame payload decoding into validated measurements

use crate::historic::line::LineParser;
use std::time::SystemTime;
use teleinfo_core::constants::{CARRIAGE_RETURN, LINE_FEED};
use teleinfo_core::{RejectedLine, ValidatedMeasurement};

/// Outcome of decoding one dataset line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line passed checksum validation
    Measurement(ValidatedMeasurement),
    /// The line was rejected; original bytes retained
    Rejected(RejectedLine),
}

impl LineOutcome {
    /// Check if the outcome is a validated measurement
    pub fn is_measurement(&self) -> bool {
        matches!(self, LineOutcome::Measurement(_))
    }
}

/// Splits complete frame payloads into dataset lines and validates each
pub struct FrameDecoder;

impl FrameDecoder {
    /// Decode a complete frame payload
    ///
    /// Splits on LF, trims CR and stray terminators from segment ends, and
    /// drops empty segments. Outcomes keep the wire order so a later
    /// duplicate of a label wins downstream, and one malformed line never
    /// aborts the remaining lines of the frame.
    pub fn decode(frame: &[u8], observed_at: SystemTime) -> Vec<LineOutcome> {
        frame
            .split(|&byte| byte == LINE_FEED)
            .map(Self::trim_terminators)
            .filter(|segment| !segment.is_empty())
            .map(|segment| match LineParser::parse(segment, observed_at) {
                Ok(measurement) => LineOutcome::Measurement(measurement),
                Err(rejected) => LineOutcome::Rejected(rejected),
            })
            .collect()
    }

    fn trim_terminators(mut segment: &[u8]) -> &[u8] {
        fn is_terminator(byte: u8) -> bool {
            byte == CARRIAGE_RETURN || byte == LINE_FEED
        }
        while let [first, rest @ ..] = segment {
            if !is_terminator(*first) {
                break;
            }
            segment = rest;
        }
        while let [rest @ .., last] = segment {
            if !is_terminator(*last) {
                break;
            }
            segment = rest;
        }
        segment
    }
}
