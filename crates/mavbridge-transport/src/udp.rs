use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use bytes::Bytes;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Well-known port telemetry producers send to.
pub const DEFAULT_INGEST_PORT: u16 = 14551;

/// Largest payload a single UDP datagram can carry.
pub const MAX_DATAGRAM_SIZE: usize = 65_535;

/// One delivery unit from the ingest transport.
#[derive(Debug, Clone)]
pub struct Datagram {
    /// The datagram contents, exactly as received.
    pub bytes: Bytes,
    /// Sender address, when the transport reports one.
    pub peer: Option<SocketAddr>,
}

/// Connectionless datagram source bound to a fixed address.
///
/// Datagrams may arrive out of order or duplicated; the socket hands them
/// over as-is and keeps no state between receives.
#[derive(Debug)]
pub struct IngestSocket {
    socket: UdpSocket,
    local_addr: SocketAddr,
    buf: Vec<u8>,
}

impl IngestSocket {
    /// Bind to `addr` with a receive buffer large enough for any datagram.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        Self::bind_with_buffer(addr, MAX_DATAGRAM_SIZE).await
    }

    /// Bind to `addr` with an explicit receive buffer size.
    ///
    /// Datagrams longer than `recv_buffer` are truncated by the OS.
    pub async fn bind_with_buffer(addr: SocketAddr, recv_buffer: usize) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| TransportError::Bind {
                endpoint: addr.to_string(),
                source,
            })?;
        let local_addr = socket.local_addr()?;

        info!(%local_addr, "listening for telemetry datagrams");

        Ok(Self {
            socket,
            local_addr,
            buf: vec![0u8; recv_buffer.clamp(1, MAX_DATAGRAM_SIZE)],
        })
    }

    /// Wait for the next datagram.
    ///
    /// Cancel safe: dropping the future before it completes loses nothing.
    pub async fn recv(&mut self) -> Result<Datagram> {
        let (len, peer) = self
            .socket
            .recv_from(&mut self.buf)
            .await
            .map_err(TransportError::Recv)?;
        debug!(len, %peer, "datagram received");
        Ok(Datagram {
            bytes: Bytes::copy_from_slice(&self.buf[..len]),
            peer: Some(peer),
        })
    }

    /// Address the socket is actually bound to (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

/// Blocking datagram sender used to push synthetic telemetry at a relay.
pub struct DatagramSender {
    socket: std::net::UdpSocket,
    target: SocketAddr,
}

impl DatagramSender {
    /// Bind an ephemeral local port of the same address family as `target`.
    pub fn connect(target: SocketAddr) -> Result<Self> {
        let local: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = std::net::UdpSocket::bind(local).map_err(|source| TransportError::Bind {
            endpoint: local.to_string(),
            source,
        })?;
        socket
            .connect(target)
            .map_err(|source| TransportError::Connect {
                endpoint: target.to_string(),
                source,
            })?;
        debug!(%target, "datagram sender ready");
        Ok(Self { socket, target })
    }

    /// Send one datagram.
    pub fn send(&self, datagram: &[u8]) -> Result<usize> {
        self.socket.send(datagram).map_err(TransportError::Send)
    }

    /// Where datagrams are sent.
    pub fn target(&self) -> SocketAddr {
        self.target
    }
}
