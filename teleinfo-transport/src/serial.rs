//! Serial port chunk source
//!
//! Reads the meter's TIC output directly. Historic Mode uses a 1200 baud,
//! 7 data bits, even parity, one stop bit line discipline.

use crate::source::{ChunkListener, ChunkSource};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use teleinfo_core::{TicError, TicResult};
use tokio::io::AsyncReadExt;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

/// Historic Mode baud rate
pub const DEFAULT_BAUD_RATE: u32 = 1200;

const READ_CHUNK_SIZE: usize = 512;

/// Serial port settings
#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: tokio_serial::DataBits,
    pub stop_bits: tokio_serial::StopBits,
    pub parity: tokio_serial::Parity,
    pub flow_control: tokio_serial::FlowControl,
    pub timeout: Option<Duration>,
}

impl SerialSettings {
    /// Create serial settings with the Historic Mode line discipline
    pub fn new(port_name: String) -> Self {
        Self {
            port_name,
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: tokio_serial::DataBits::Seven,
            stop_bits: tokio_serial::StopBits::One,
            parity: tokio_serial::Parity::Even,
            flow_control: tokio_serial::FlowControl::None,
            timeout: None,
        }
    }

    /// Create serial settings with an explicit baud rate
    pub fn with_baud_rate(port_name: String, baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Self::new(port_name)
        }
    }
}

/// Serial port chunk source implementation
pub struct SerialChunkSource {
    stream: Option<SerialStream>,
    settings: SerialSettings,
    closed: bool,
}

impl SerialChunkSource {
    /// Create a new serial chunk source
    pub fn new(settings: SerialSettings) -> Self {
        Self {
            stream: None,
            settings,
            closed: true,
        }
    }
}

#[async_trait]
impl ChunkListener for SerialChunkSource {
    async fn open(&mut self) -> TicResult<()> {
        if !self.closed {
            return Err(TicError::Connection(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Serial port has already been opened",
            )));
        }

        let builder = tokio_serial::new(&self.settings.port_name, self.settings.baud_rate)
            .data_bits(self.settings.data_bits)
            .stop_bits(self.settings.stop_bits)
            .parity(self.settings.parity)
            .flow_control(self.settings.flow_control);

        let stream = builder.open_native_async().map_err(|e| {
            TicError::Serial(format!(
                "Failed to open serial port {}: {}",
                self.settings.port_name, e
            ))
        })?;
        log::info!(
            "Serial reader started on {} at {} baud",
            self.settings.port_name,
            self.settings.baud_rate
        );

        self.stream = Some(stream);
        self.closed = false;
        Ok(())
    }
}

#[async_trait]
impl ChunkSource for SerialChunkSource {
    async fn recv(&mut self) -> TicResult<Bytes> {
        let stream = self.stream.as_mut().ok_or_else(|| {
            TicError::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Serial stream not open",
            ))
        })?;

        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        let result = if let Some(timeout) = self.settings.timeout {
            tokio::time::timeout(timeout, stream.read(&mut buf))
                .await
                .map_err(|_| TicError::Timeout)?
                .map_err(TicError::Connection)
        } else {
            stream.read(&mut buf).await.map_err(TicError::Connection)
        };

        match result {
            Ok(0) => {
                self.closed = true;
                Err(TicError::Connection(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "Serial stream closed",
                )))
            }
            Ok(n) => {
                buf.truncate(n);
                Ok(Bytes::from(buf))
            }
            Err(e) => {
                self.closed = true;
                Err(e)
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> TicResult<()> {
        self.stream = None;
        self.closed = true;
        log::info!("Serial reader stopped on {}", self.settings.port_name);
        Ok(())
    }
}
