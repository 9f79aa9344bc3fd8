//! Telemetry fan-out.
//!
//! The relay owns one single-threaded loop. Each datagram is scanned,
//! decoded and broadcast to completion before the next datagram, subscriber
//! connect or disconnect is handled:
//!
//! ```text
//! datagram ─► FrameScanner ─► Decoder ─► Broadcaster ─► subscribers
//! ```
//!
//! Subscriber membership belongs to the connection layer
//! ([`SubscriberRegistry`], driven by [`Relay`]); the [`Broadcaster`] only
//! delivers to whichever subscribers are ready.

pub mod broadcaster;
pub mod config;
#[cfg(unix)]
pub mod connection;
pub mod counters;
pub mod error;
pub mod pipeline;
pub mod registry;
#[cfg(unix)]
pub mod server;
pub mod subscriber;

pub use broadcaster::{BroadcastReport, Broadcaster};
pub use config::RelayConfig;
#[cfg(unix)]
pub use connection::{spawn_connection, QueuedSubscriber};
pub use counters::{CounterSnapshot, Counters};
pub use error::{RelayError, Result};
pub use pipeline::{DatagramReport, Pipeline};
pub use registry::SubscriberRegistry;
#[cfg(unix)]
pub use server::Relay;
pub use subscriber::{SendError, Subscriber, SubscriberId};
