//! Message decoding for scanned frames.
//!
//! Three message kinds are decoded into [`TelemetryEvent`]s; every other
//! message id is recognized as a frame and skipped:
//!
//! | id | message               | min payload |
//! |----|-----------------------|-------------|
//! | 0  | `HEARTBEAT`           | 9           |
//! | 30 | `ATTITUDE`            | 28          |
//! | 33 | `GLOBAL_POSITION_INT` | 28          |
//!
//! Decoding never reads outside the frame's payload and never fails: a
//! frame that cannot produce an event yields a [`Decode`] outcome saying why.

pub mod decoder;
pub mod event;
pub mod ids;
pub mod raw;

pub use decoder::{Decode, Decoder, DecoderConfig, HeartbeatFilter};
pub use event::{Attitude, Heartbeat, Position, TelemetryEvent};
pub use ids::{
    message_name, ATTITUDE, GLOBAL_POSITION_INT, HEARTBEAT,
    MAV_AUTOPILOT_ARDUPILOTMEGA, MAV_MODE_FLAG_SAFETY_ARMED, MAV_TYPE_QUADROTOR,
};
pub use raw::{RawAttitude, RawGlobalPosition, RawHeartbeat};
