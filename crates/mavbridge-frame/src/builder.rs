use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::scanner::{ProtocolVersion, CHECKSUM_LEN};

/// Largest payload the 8-bit length field can declare.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// Header fields of a frame to build. Flags are ignored for v1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameHeader {
    pub sequence: u8,
    pub system_id: u8,
    pub component_id: u8,
    pub message_id: u32,
    pub incompat_flags: u8,
    pub compat_flags: u8,
}

/// Encode one frame onto `dst`.
///
/// Wire format:
/// ```text
/// v1 ┌──────┬─────┬─────┬───────┬────────┬───────┬───────────┬──────────┐
///    │ 0xFE │ len │ seq │ sysid │ compid │ msgid │ payload   │ ck (2B)  │
///    └──────┴─────┴─────┴───────┴────────┴───────┴───────────┴──────────┘
/// v2 ┌──────┬─────┬──────────┬────────┬─────┬───────┬────────┬──────────────┬─────────┬─────────┐
///    │ 0xFD │ len │ incompat │ compat │ seq │ sysid │ compid │ msgid (3B LE)│ payload │ ck (2B) │
///    └──────┴─────┴──────────┴────────┴─────┴───────┴────────┴──────────────┴─────────┴─────────┘
/// ```
///
/// The checksum bytes are written as zero.
pub fn encode_frame(
    version: ProtocolVersion,
    header: &FrameHeader,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    if header.message_id > version.max_message_id() {
        return Err(FrameError::MessageIdOutOfRange {
            id: header.message_id,
            version: version.as_str(),
            max: version.max_message_id(),
        });
    }

    dst.reserve(version.header_len() + payload.len() + CHECKSUM_LEN);
    dst.put_u8(version.sync_byte());
    dst.put_u8(payload.len() as u8);
    match version {
        ProtocolVersion::V1 => {
            dst.put_u8(header.sequence);
            dst.put_u8(header.system_id);
            dst.put_u8(header.component_id);
            dst.put_u8(header.message_id as u8);
        }
        ProtocolVersion::V2 => {
            dst.put_u8(header.incompat_flags);
            dst.put_u8(header.compat_flags);
            dst.put_u8(header.sequence);
            dst.put_u8(header.system_id);
            dst.put_u8(header.component_id);
            dst.put_uint_le(u64::from(header.message_id), 3);
        }
    }
    dst.put_slice(payload);
    dst.put_u16_le(0);
    Ok(())
}
