//! Frame reassembly over an unreliable chunked transport

use bytes::{BufMut, Bytes, BytesMut};
use teleinfo_core::constants::{FRAME_END, FRAME_START};

/// Default upper bound on an accumulating frame buffer
///
/// A Historic Mode frame is a few hundred bytes at most; the cap only exists
/// to bound memory when the transport delivers garbage between markers.
pub const DEFAULT_MAX_FRAME_LEN: usize = 8192;

/// Frame assembler configuration
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Discard-and-resync threshold for the accumulation buffer
    pub max_frame_len: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

/// Reassembly state
///
/// # State Transitions
/// ```text
/// AwaitingStart -> Accumulating (on STX)
/// Accumulating  -> Accumulating (on STX: discard partial buffer, restart)
/// Accumulating  -> AwaitingStart (on ETX: emit frame, or on buffer overrun: discard)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssemblerState {
    /// No start marker seen yet; all bytes are ignored
    #[default]
    AwaitingStart,
    /// Between markers; bytes accumulate into the frame buffer
    Accumulating,
}

impl AssemblerState {
    /// Check if a frame is currently being accumulated
    pub fn is_accumulating(&self) -> bool {
        matches!(self, AssemblerState::Accumulating)
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            AssemblerState::AwaitingStart => "AwaitingStart",
            AssemblerState::Accumulating => "Accumulating",
        }
    }
}

/// Reassembles STX/ETX-delimited frames from arbitrarily-chunked raw bytes
///
/// The transport guarantees nothing about chunk boundaries: a chunk may hold
/// zero, one, or many frame fragments. A spurious start marker while
/// accumulating discards the partial buffer and restarts from the new marker,
/// which is what lets the assembler resynchronize after a lost or truncated
/// frame. One assembler instance serves one logical TIC stream.
#[derive(Debug)]
pub struct FrameAssembler {
    state: AssemblerState,
    buffer: BytesMut,
    config: AssemblerConfig,
    frames_discarded: u64,
}

impl FrameAssembler {
    /// Create a new frame assembler with default configuration
    pub fn new() -> Self {
        Self::with_config(AssemblerConfig::default())
    }

    /// Create a new frame assembler with explicit configuration
    pub fn with_config(config: AssemblerConfig) -> Self {
        Self {
            state: AssemblerState::AwaitingStart,
            buffer: BytesMut::new(),
            config,
            frames_discarded: 0,
        }
    }

    /// Get the current reassembly state
    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Get the number of partial frames discarded so far
    pub fn frames_discarded(&self) -> u64 {
        self.frames_discarded
    }

    /// Drop any partial frame and return to the initial state
    pub fn reset(&mut self) {
        if !self.buffer.is_empty() {
            self.frames_discarded += 1;
        }
        self.buffer.clear();
        self.state = AssemblerState::AwaitingStart;
    }

    /// Feed a raw chunk, lazily yielding each frame it completes
    ///
    /// Frame payloads exclude both markers. Unparseable input never fails;
    /// it simply yields no frames.
    pub fn feed<'a>(&'a mut self, chunk: &'a [u8]) -> FeedFrames<'a> {
        FeedFrames {
            assembler: self,
            chunk,
            position: 0,
        }
    }

    fn push(&mut self, byte: u8) -> Option<Bytes> {
        match self.state {
            AssemblerState::AwaitingStart => {
                if byte == FRAME_START {
                    self.state = AssemblerState::Accumulating;
                    self.buffer.clear();
                }
                None
            }
            AssemblerState::Accumulating => match byte {
                // A new start marker means the frame in progress was
                // truncated; only a non-empty buffer counts as a loss.
                FRAME_START => {
                    if !self.buffer.is_empty() {
                        self.frames_discarded += 1;
                        self.buffer.clear();
                    }
                    None
                }
                FRAME_END => {
                    self.state = AssemblerState::AwaitingStart;
                    Some(self.buffer.split().freeze())
                }
                _ => {
                    if self.buffer.len() >= self.config.max_frame_len {
                        self.frames_discarded += 1;
                        self.buffer.clear();
                        self.state = AssemblerState::AwaitingStart;
                    } else {
                        self.buffer.put_u8(byte);
                    }
                    None
                }
            },
        }
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy iterator over the frames completed by one chunk
pub struct FeedFrames<'a> {
    assembler: &'a mut FrameAssembler,
    chunk: &'a [u8],
    position: usize,
}

impl Iterator for FeedFrames<'_> {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        while self.position < self.chunk.len() {
            let byte = self.chunk[self.position];
            self.position += 1;
            if let Some(frame) = self.assembler.push(byte) {
                return Some(frame);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(assembler: &mut FrameAssembler, chunk: &[u8]) -> Vec<Bytes> {
        assembler.feed(chunk).collect()
    }

    #[test]
    fn test_single_chunk_single_frame() {
        let mut assembler = FrameAssembler::new();
        let frames = collect(&mut assembler, b"\x02PAPP 01250 )\r\n\x03");
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], b"PAPP 01250 )\r\n");
        assert_eq!(assembler.state(), AssemblerState::AwaitingStart);
        assert_eq!(assembler.frames_discarded(), 0);
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut assembler = FrameAssembler::new();
        let frames = collect(&mut assembler, b"\x02first\x03\x02second\x03");
        assert_eq!(frames.len(), 2);
        assert_eq!(&frames[0][..], b"first");
        assert_eq!(&frames[1][..], b"second");
    }

    #[test]
    fn test_bytes_outside_frames_ignored() {
        let mut assembler = FrameAssembler::new();
        let frames = collect(&mut assembler, b"noise\x02payload\x03trailing");
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], b"payload");
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut assembler = FrameAssembler::new();
        assert!(collect(&mut assembler, b"\x02PA").is_empty());
        assert!(assembler.state().is_accumulating());
        assert!(collect(&mut assembler, b"PP 012").is_empty());
        let frames = collect(&mut assembler, b"50 )\x03");
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], b"PAPP 01250 )");
    }

    #[test]
    fn test_reassembly_invariant_under_chunking() {
        let data = b"\x02BASE 012345678 /\r\nPAPP 01250 )\r\n\x03\x02IINST 018  \r\n\x03";
        let mut whole = FrameAssembler::new();
        let expected = collect(&mut whole, data);
        assert_eq!(expected.len(), 2);

        for chunk_size in 1..=data.len() {
            let mut assembler = FrameAssembler::new();
            let mut frames = Vec::new();
            for chunk in data.chunks(chunk_size) {
                frames.extend(assembler.feed(chunk));
            }
            assert_eq!(frames, expected, "chunk size {}", chunk_size);
        }
    }

    #[test]
    fn test_embedded_start_marker_resynchronizes() {
        let mut assembler = FrameAssembler::new();
        let frames = collect(&mut assembler, b"\x02PARTIAL LINE\x02GOOD 1 .\x03");
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], b"GOOD 1 .");
        assert_eq!(assembler.frames_discarded(), 1);
    }

    #[test]
    fn test_consecutive_start_markers_count_once() {
        let mut assembler = FrameAssembler::new();
        // The second STX discards nothing: no bytes accumulated yet.
        let frames = collect(&mut assembler, b"\x02\x02payload\x03");
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], b"payload");
        assert_eq!(assembler.frames_discarded(), 0);
    }

    #[test]
    fn test_buffer_cap_discards_and_resyncs() {
        let mut assembler = FrameAssembler::with_config(AssemblerConfig { max_frame_len: 8 });
        let mut input = vec![FRAME_START];
        input.extend_from_slice(&[b'x'; 64]);
        input.push(FRAME_END);
        let frames = collect(&mut assembler, &input);
        assert!(frames.is_empty());
        assert_eq!(assembler.frames_discarded(), 1);
        assert_eq!(assembler.state(), AssemblerState::AwaitingStart);

        // The assembler recovers on the next well-formed frame.
        let frames = collect(&mut assembler, b"\x02ok\x03");
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], b"ok");
    }

    #[test]
    fn test_empty_frame() {
        let mut assembler = FrameAssembler::new();
        let frames = collect(&mut assembler, b"\x02\x03");
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_empty());
    }

    #[test]
    fn test_reset_discards_partial() {
        let mut assembler = FrameAssembler::new();
        assert!(collect(&mut assembler, b"\x02PAR").is_empty());
        assembler.reset();
        assert_eq!(assembler.state(), AssemblerState::AwaitingStart);
        assert_eq!(assembler.frames_discarded(), 1);
    }
}
