//! UDP listener chunk source
//!
//! The meter-side bridge pushes TIC bytes as datagrams; this end only binds
//! and receives. Datagram boundaries are not frame boundaries.

use crate::source::{ChunkListener, ChunkSource};
use async_trait::async_trait;
use bytes::Bytes;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use teleinfo_core::{TicError, TicResult};
use tokio::net::UdpSocket;

/// Maximum UDP payload size
pub const MAX_UDP_PAYLOAD_SIZE: usize = 65507;

/// Default listening port for pushed TIC data
pub const DEFAULT_PORT: u16 = 8095;

/// UDP listener settings
#[derive(Debug, Clone)]
pub struct UdpListenerSettings {
    /// Local address to bind
    pub bind_address: SocketAddr,
    /// Only accept datagrams from this source address, if set
    pub source_filter: Option<IpAddr>,
    /// Receive timeout; `None` waits indefinitely (the stream is push-only)
    pub timeout: Option<Duration>,
}

impl UdpListenerSettings {
    /// Create new listener settings for an explicit bind address
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            source_filter: None,
            timeout: None,
        }
    }

    /// Create listener settings restricted to one sending meter bridge
    pub fn with_source_filter(bind_address: SocketAddr, source: IpAddr) -> Self {
        Self {
            bind_address,
            source_filter: Some(source),
            timeout: None,
        }
    }
}

impl Default for UdpListenerSettings {
    fn default() -> Self {
        Self::new(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            DEFAULT_PORT,
        ))
    }
}

/// UDP listener chunk source implementation
pub struct UdpChunkSource {
    socket: Option<UdpSocket>,
    settings: UdpListenerSettings,
    closed: bool,
}

impl UdpChunkSource {
    /// Create a new UDP chunk source
    pub fn new(settings: UdpListenerSettings) -> Self {
        Self {
            socket: None,
            settings,
            closed: true,
        }
    }

    /// Create a UDP chunk source listening on all interfaces at `port`
    pub fn on_port(port: u16) -> Self {
        Self::new(UdpListenerSettings::new(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port,
        )))
    }

    /// Create a UDP chunk source from a bind address string
    pub fn from_address(address: &str) -> TicResult<Self> {
        let bind_address: SocketAddr = address
            .parse()
            .map_err(|e| TicError::InvalidData(format!("Invalid bind address: {}", e)))?;
        Ok(Self::new(UdpListenerSettings::new(bind_address)))
    }

    async fn recv_datagram(&self) -> TicResult<Bytes> {
        let socket = self.socket.as_ref().ok_or_else(|| {
            TicError::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "UDP socket not bound",
            ))
        })?;

        loop {
            let mut buf = vec![0u8; MAX_UDP_PAYLOAD_SIZE];

            let (len, addr) = if let Some(timeout) = self.settings.timeout {
                tokio::time::timeout(timeout, socket.recv_from(&mut buf))
                    .await
                    .map_err(|_| TicError::Timeout)?
                    .map_err(TicError::Connection)?
            } else {
                socket.recv_from(&mut buf).await.map_err(TicError::Connection)?
            };

            if let Some(filter) = self.settings.source_filter {
                if addr.ip() != filter {
                    log::debug!("Ignoring datagram from unexpected source {}", addr);
                    continue;
                }
            }

            log::debug!("Received datagram from {} ({} bytes)", addr, len);
            buf.truncate(len);
            return Ok(Bytes::from(buf));
        }
    }
}

#[async_trait]
impl ChunkListener for UdpChunkSource {
    async fn open(&mut self) -> TicResult<()> {
        if !self.closed {
            return Err(TicError::Connection(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Listener has already been opened",
            )));
        }

        let socket = UdpSocket::bind(self.settings.bind_address)
            .await
            .map_err(TicError::Connection)?;
        log::info!("UDP listener started on {}", self.settings.bind_address);

        self.socket = Some(socket);
        self.closed = false;
        Ok(())
    }
}

#[async_trait]
impl ChunkSource for UdpChunkSource {
    async fn recv(&mut self) -> TicResult<Bytes> {
        self.recv_datagram().await
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> TicResult<()> {
        self.socket = None;
        self.closed = true;
        log::info!("UDP listener stopped on {}", self.settings.bind_address);
        Ok(())
    }
}
