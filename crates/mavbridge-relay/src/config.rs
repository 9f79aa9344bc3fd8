use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use mavbridge_message::DecoderConfig;
use mavbridge_transport::{DEFAULT_INGEST_PORT, MAX_DATAGRAM_SIZE};

/// Configuration for a [`Relay`](crate::Relay).
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the ingest socket binds to.
    pub udp_addr: SocketAddr,
    /// Unix socket path subscribers connect to.
    pub socket_path: PathBuf,
    /// Records buffered per subscriber before new ones are dropped.
    pub subscriber_queue: usize,
    /// Receive buffer size; longer datagrams are truncated.
    pub recv_buffer: usize,
    /// How often to log counters. `None` disables the stats log.
    pub stats_interval: Option<Duration>,
    /// Rebind attempts after an ingest socket failure before giving up.
    pub max_rebind_attempts: u32,
    pub decoder: DecoderConfig,
}

impl RelayConfig {
    /// Socket path used when none is configured.
    pub fn default_socket_path() -> PathBuf {
        std::env::temp_dir().join("mavbridge.sock")
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            udp_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_INGEST_PORT)),
            socket_path: Self::default_socket_path(),
            subscriber_queue: 256,
            recv_buffer: MAX_DATAGRAM_SIZE,
            stats_interval: Some(Duration::from_secs(5)),
            max_rebind_attempts: 5,
            decoder: DecoderConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.udp_addr.to_string(), "0.0.0.0:14551");
        assert!(config.socket_path.ends_with("mavbridge.sock"));
        assert_eq!(config.subscriber_queue, 256);
        assert_eq!(config.recv_buffer, 65_535);
        assert_eq!(config.stats_interval, Some(Duration::from_secs(5)));
        assert!(config.decoder.heartbeat_filter.is_some());
    }
}
