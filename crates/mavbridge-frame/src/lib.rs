//! Frame scanning for MAVLink datagrams.
//!
//! A datagram may hold zero, one or many frames, possibly surrounded by
//! noise. [`FrameScanner`] walks one buffer left to right and yields a
//! [`FrameDescriptor`] for every structurally complete frame:
//! - `0xFE` starts a v1 frame with a 6-byte header
//! - `0xFD` starts a v2 frame with a 10-byte header
//! - any other byte is skipped one at a time until a sync marker appears
//!
//! Declared lengths are checked against the bytes actually present before
//! anything past the header is trusted. A frame that runs off the end of the
//! buffer stops the scan; nothing is carried over to the next datagram.
//! Checksums are never verified.

pub mod builder;
pub mod error;
pub mod scanner;

pub use builder::{encode_frame, FrameHeader, MAX_PAYLOAD};
pub use error::{FrameError, Result};
pub use scanner::{
    scan, FrameDescriptor, FrameScanner, ProtocolVersion, ScanHalt, CHECKSUM_LEN, MIN_SCAN_BYTES,
    V1_HEADER_LEN, V1_SYNC, V2_HEADER_LEN, V2_SYNC,
};
