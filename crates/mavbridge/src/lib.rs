//! MAVLink telemetry bridge.
//!
//! Receives MAVLink v1/v2 datagrams over UDP, extracts frames, decodes
//! heartbeat, attitude and global-position messages into display units, and
//! fans the resulting JSON records out to every connected subscriber.
//!
//! # Crate Structure
//!
//! - [`transport`]: UDP ingest socket and Unix subscriber socket
//! - [`frame`]: frame scanner and frame builder
//! - [`message`]: payload layouts, decoder and telemetry events
//! - [`relay`]: broadcaster, subscriber registry and relay loop (behind `relay` feature)

/// Re-export transport types.
pub mod transport {
    pub use mavbridge_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use mavbridge_frame::*;
}

/// Re-export message types.
pub mod message {
    pub use mavbridge_message::*;
}

/// Re-export relay types (requires `relay` feature).
#[cfg(feature = "relay")]
pub mod relay {
    pub use mavbridge_relay::*;
}
