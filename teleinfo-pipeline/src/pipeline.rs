//! End-to-end TIC pipeline: raw chunks in, change events out

use bytes::Bytes;
use std::sync::Arc;
use std::time::SystemTime;
use teleinfo_core::{RejectReason, TicResult};
use teleinfo_session::historic::{
    AssemblerConfig, FrameAssembler, FrameDecoder, LineOutcome, ProtocolStatistics,
};
use teleinfo_store::{ChangeEvent, ChangeOutcome, LabelValueStore};
use teleinfo_transport::ChunkSource;
use tokio::sync::{mpsc, RwLock};

/// Capacity of the change event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Single-stream processing pipeline
///
/// Owns one frame assembler (one pipeline per logical TIC stream) and an
/// injected, possibly shared, label value store. Each inbound chunk is
/// processed to completion — assembler, decoder, store — before the next is
/// accepted, so the pipeline itself needs no internal locking; the store and
/// the statistics are shared handles a concurrent consumer may read at any
/// time.
///
/// Malformed input never aborts the pipeline: damage is isolated to one line
/// or one frame and counted.
pub struct TicPipeline {
    assembler: FrameAssembler,
    store: Arc<LabelValueStore>,
    statistics: Arc<RwLock<ProtocolStatistics>>,
    events: mpsc::Sender<ChangeEvent>,
}

impl TicPipeline {
    /// Create a pipeline with default assembler configuration
    ///
    /// Returns the pipeline and the receiving end of its change event
    /// channel.
    pub fn new(store: Arc<LabelValueStore>) -> (Self, mpsc::Receiver<ChangeEvent>) {
        Self::with_config(store, AssemblerConfig::default())
    }

    /// Create a pipeline with explicit assembler configuration
    pub fn with_config(
        store: Arc<LabelValueStore>,
        config: AssemblerConfig,
    ) -> (Self, mpsc::Receiver<ChangeEvent>) {
        let (events, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let pipeline = Self {
            assembler: FrameAssembler::with_config(config),
            store,
            statistics: Arc::new(RwLock::new(ProtocolStatistics::new())),
            events,
        };
        (pipeline, receiver)
    }

    /// Get a handle to the store this pipeline applies measurements to
    pub fn store(&self) -> Arc<LabelValueStore> {
        self.store.clone()
    }

    /// Get a shared handle to the observability counters
    pub fn statistics_handle(&self) -> Arc<RwLock<ProtocolStatistics>> {
        self.statistics.clone()
    }

    /// Get a copy of the current observability counters
    pub async fn statistics(&self) -> ProtocolStatistics {
        self.statistics.read().await.clone()
    }

    /// Process one raw chunk to completion
    ///
    /// All measurements validated from this chunk share one receipt
    /// timestamp.
    pub async fn handle_chunk(&mut self, chunk: &[u8]) {
        let observed_at = SystemTime::now();
        let frames: Vec<Bytes> = self.assembler.feed(chunk).collect();

        let mut statistics = self.statistics.write().await;
        statistics.frames_discarded = self.assembler.frames_discarded();

        for frame in frames {
            statistics.increment_frames_accepted();
            for outcome in FrameDecoder::decode(&frame, observed_at) {
                match outcome {
                    LineOutcome::Measurement(measurement) => {
                        statistics.increment_lines_accepted();
                        if let ChangeOutcome::Changed(event) =
                            self.store.apply(&measurement).await
                        {
                            log::debug!("{}", event);
                            self.publish(event);
                        }
                    }
                    LineOutcome::Rejected(rejected) => {
                        match rejected.reason() {
                            RejectReason::ChecksumMismatch => {
                                statistics.increment_lines_rejected_checksum()
                            }
                            RejectReason::Unparseable => {
                                statistics.increment_lines_rejected_unparseable()
                            }
                        }
                        log::warn!("Rejected dataset line - {}", rejected);
                    }
                }
            }
        }
    }

    /// Drive the pipeline from a chunk source until it closes or fails
    pub async fn run<S: ChunkSource>(&mut self, source: &mut S) -> TicResult<()> {
        loop {
            let chunk = match source.recv().await {
                Ok(chunk) => chunk,
                Err(e) => {
                    if source.is_closed() {
                        log::info!("Chunk source closed, stopping pipeline");
                        return Ok(());
                    }
                    log::error!("Error receiving chunk: {}", e);
                    return Err(e);
                }
            };
            self.handle_chunk(&chunk).await;
        }
    }

    // The publisher may be slow or gone; the pipeline must never stall on it.
    fn publish(&self, event: ChangeEvent) {
        if let Err(e) = self.events.try_send(event) {
            log::debug!("Change event not delivered: {}", e);
        }
    }
}
