//! Transports at the edges of the relay.
//!
//! - [`IngestSocket`] receives raw telemetry datagrams over UDP.
//! - [`SubscriberSocket`] accepts downstream subscriber connections over a
//!   Unix domain socket.
//!
//! Neither type interprets the bytes it moves. Frame scanning and decoding
//! live in `mavbridge-frame` and `mavbridge-message`.

pub mod error;
pub mod udp;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use udp::{Datagram, DatagramSender, IngestSocket, DEFAULT_INGEST_PORT, MAX_DATAGRAM_SIZE};

#[cfg(unix)]
pub use uds::SubscriberSocket;
