//! Dataset line splitting and validation

use crate::historic::checksum::ChecksumCalc;
use std::time::SystemTime;
use teleinfo_core::constants::{is_separator, is_token_byte};
use teleinfo_core::{RejectReason, RejectedLine, ValidatedMeasurement};

/// One dataset line split into its wire-level fields
///
/// Wire shape: `label <sep> [value] <sep> checksum`, where `<sep>` is the
/// space or tab byte actually transmitted. The separator bytes are kept
/// because they participate in checksum recomputation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLine {
    label: String,
    value: String,
    separator: Option<u8>,
    trailing_separator: u8,
    checksum: u8,
}

impl DatasetLine {
    /// Split a raw line into fields without validating the checksum
    ///
    /// The last byte is taken as the checksum character and the byte before
    /// it must be a separator; the rest splits on its first separator byte
    /// into label and value. A separator byte occurring *inside* the value is
    /// indistinguishable from a malformed split and rejects the line rather
    /// than guessing.
    pub fn split(raw: &[u8]) -> Result<Self, RejectReason> {
        // Shortest well-formed line: one-byte label, separator, checksum
        if raw.len() < 3 {
            return Err(RejectReason::Unparseable);
        }

        let checksum = raw[raw.len() - 1];
        let body = &raw[..raw.len() - 1];

        let trailing_separator = match body.last() {
            Some(&byte) if is_separator(byte) => byte,
            _ => return Err(RejectReason::Unparseable),
        };
        let data = &body[..body.len() - 1];

        let (label_bytes, value_bytes, separator) =
            match data.iter().position(|&byte| is_separator(byte)) {
                Some(index) => (&data[..index], &data[index + 1..], Some(data[index])),
                None => (data, &data[..0], None),
            };

        if label_bytes.is_empty() {
            return Err(RejectReason::Unparseable);
        }
        if !label_bytes.iter().all(|&byte| is_token_byte(byte)) {
            return Err(RejectReason::Unparseable);
        }
        // Token bytes exclude both separators, so this also rejects a second
        // separator hiding inside the value.
        if !value_bytes.iter().all(|&byte| is_token_byte(byte)) {
            return Err(RejectReason::Unparseable);
        }

        let label = String::from_utf8(label_bytes.to_vec())
            .map_err(|_| RejectReason::Unparseable)?;
        let value = String::from_utf8(value_bytes.to_vec())
            .map_err(|_| RejectReason::Unparseable)?;

        Ok(Self {
            label,
            value,
            separator,
            trailing_separator,
            checksum,
        })
    }

    /// Get the line label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get the line value (may be empty)
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Get the field separator byte actually used on the wire
    pub fn separator(&self) -> u8 {
        self.separator.unwrap_or(self.trailing_separator)
    }

    /// Get the received checksum byte
    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Validate the received checksum against both Historic Mode conventions
    ///
    /// Meter firmwares disagree on whether the separator preceding the
    /// checksum character participates in the sum; the sum is recomputed
    /// without it first, then extended by that one byte.
    pub fn checksum_valid(&self) -> bool {
        let mut calc = ChecksumCalc::new();
        calc.update_bytes(self.label.as_bytes());
        if let Some(separator) = self.separator {
            calc.update(separator);
            calc.update_bytes(self.value.as_bytes());
        }
        if calc.matches(self.checksum) {
            return true;
        }
        calc.update(self.trailing_separator);
        calc.matches(self.checksum)
    }

    fn into_measurement(self, observed_at: SystemTime) -> ValidatedMeasurement {
        ValidatedMeasurement::new(self.label, self.value, observed_at)
    }
}

/// Parses and validates single dataset lines
pub struct LineParser;

impl LineParser {
    /// Parse one dataset line into a validated measurement
    ///
    /// `observed_at` is the receipt time of the enclosing frame. Rejected
    /// lines carry the original bytes for diagnostics.
    pub fn parse(
        raw: &[u8],
        observed_at: SystemTime,
    ) -> Result<ValidatedMeasurement, RejectedLine> {
        match Self::try_parse(raw, observed_at) {
            Ok(measurement) => Ok(measurement),
            Err(reason) => Err(RejectedLine::new(reason, raw.to_vec())),
        }
    }

    fn try_parse(
        raw: &[u8],
        observed_at: SystemTime,
    ) -> Result<ValidatedMeasurement, RejectReason> {
        let line = DatasetLine::split(raw)?;
        if !line.checksum_valid() {
            return Err(RejectReason::ChecksumMismatch);
        }
        Ok(line.into_measurement(observed_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::historic::checksum::checksum;

    fn now() -> SystemTime {
        SystemTime::UNIX_EPOCH
    }

    /// Build a line with the checksum computed over `label + sep + value`
    fn make_line(label: &str, value: &str, sep: u8) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(label.as_bytes());
        data.push(sep);
        data.extend_from_slice(value.as_bytes());
        let chk = checksum(&data);
        data.push(sep);
        data.push(chk);
        data
    }

    /// Build a line with the checksum also covering the trailing separator
    fn make_line_trailing_variant(label: &str, value: &str, sep: u8) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(label.as_bytes());
        data.push(sep);
        data.extend_from_slice(value.as_bytes());
        data.push(sep);
        let chk = checksum(&data);
        data.push(chk);
        data
    }

    #[test]
    fn test_round_trip_space_separator() {
        let raw = make_line("BASE", "012345678", b' ');
        let m = LineParser::parse(&raw, now()).unwrap();
        assert_eq!(m.label(), "BASE");
        assert_eq!(m.value(), "012345678");
    }

    #[test]
    fn test_round_trip_tab_separator() {
        let raw = make_line("MOTDETAT", "000000", b'\t');
        let m = LineParser::parse(&raw, now()).unwrap();
        assert_eq!(m.label(), "MOTDETAT");
        assert_eq!(m.value(), "000000");
    }

    #[test]
    fn test_both_checksum_conventions_accepted() {
        // Hand-computed: "BASE 012345678" sums to '/' without the trailing
        // separator and to 'O' with it.
        let without = b"BASE 012345678 /";
        let with = b"BASE 012345678 O";
        assert!(LineParser::parse(without, now()).is_ok());
        assert!(LineParser::parse(with, now()).is_ok());
    }

    #[test]
    fn test_checksum_char_may_be_space() {
        // sum("IINST 018") = 576, 576 & 0x3F = 0 -> checksum byte 0x20
        let raw = b"IINST 018  ";
        let m = LineParser::parse(raw, now()).unwrap();
        assert_eq!(m.label(), "IINST");
        assert_eq!(m.value(), "018");
    }

    #[test]
    fn test_empty_value() {
        let raw = make_line_trailing_variant("ADPS", "", b' ');
        let m = LineParser::parse(&raw, now()).unwrap();
        assert_eq!(m.label(), "ADPS");
        assert_eq!(m.value(), "");
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut raw = make_line("PAPP", "01250", b' ');
        let last = raw.len() - 1;
        raw[last] = raw[last].wrapping_add(1);
        let rejected = LineParser::parse(&raw, now()).unwrap_err();
        assert_eq!(rejected.reason(), RejectReason::ChecksumMismatch);
        assert_eq!(rejected.raw(), &raw[..]);
    }

    #[test]
    fn test_any_payload_mutation_detected() {
        // A +1 byte mutation shifts the sum by 1 mod 64, which neither
        // checksum convention can absorb.
        let raw = make_line("HCHP", "043059804", b' ');
        for position in 0..raw.len() - 2 {
            let mut mutated = raw.clone();
            mutated[position] = mutated[position].wrapping_add(1);
            let result = LineParser::parse(&mutated, now());
            match result {
                Ok(m) => panic!(
                    "mutation at {} slipped through as {}={}",
                    position,
                    m.label(),
                    m.value()
                ),
                Err(rejected) => assert!(matches!(
                    rejected.reason(),
                    RejectReason::ChecksumMismatch | RejectReason::Unparseable
                )),
            }
        }
    }

    #[test]
    fn test_separator_inside_value_rejected() {
        // "OPTARIF BA SE" would need a guess about which separator splits;
        // reject instead.
        let mut data = b"OPTARIF BA SE".to_vec();
        let chk = checksum(&data);
        data.push(b' ');
        data.push(chk);
        let rejected = LineParser::parse(&data, now()).unwrap_err();
        assert_eq!(rejected.reason(), RejectReason::Unparseable);
    }

    #[test]
    fn test_empty_label_rejected() {
        let rejected = LineParser::parse(b" 01250 X", now()).unwrap_err();
        assert_eq!(rejected.reason(), RejectReason::Unparseable);
    }

    #[test]
    fn test_missing_separator_rejected() {
        let rejected = LineParser::parse(b"PAPP01250X", now()).unwrap_err();
        assert_eq!(rejected.reason(), RejectReason::Unparseable);
    }

    #[test]
    fn test_too_short_rejected() {
        assert!(LineParser::parse(b"", now()).is_err());
        assert!(LineParser::parse(b"P", now()).is_err());
        assert!(LineParser::parse(b"P ", now()).is_err());
    }

    #[test]
    fn test_control_bytes_rejected() {
        let rejected = LineParser::parse(b"PA\x01PP 01250 X", now()).unwrap_err();
        assert_eq!(rejected.reason(), RejectReason::Unparseable);
    }

    #[test]
    fn test_split_fields() {
        let line = DatasetLine::split(b"PTEC TH.. $").unwrap();
        assert_eq!(line.label(), "PTEC");
        assert_eq!(line.value(), "TH..");
        assert_eq!(line.separator(), b' ');
        assert_eq!(line.checksum(), b'$');
    }
}
