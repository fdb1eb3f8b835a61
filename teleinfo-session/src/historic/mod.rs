//! TIC Historic Mode session layer
//!
//! Frame reassembly, dataset line parsing, and checksum validation for the
//! fixed-format Historic Mode variant with single-character checksums.
//! Standard Mode uses a different checksum width and separators and is not
//! handled here.

pub mod assembler;
pub mod checksum;
pub mod decoder;
pub mod line;
pub mod statistics;

pub use assembler::{
    AssemblerConfig, AssemblerState, FeedFrames, FrameAssembler, DEFAULT_MAX_FRAME_LEN,
};
pub use checksum::{checksum, ChecksumCalc};
pub use decoder::{FrameDecoder, LineOutcome};
pub use line::{DatasetLine, LineParser};
pub use statistics::ProtocolStatistics;
