use std::fmt;
use std::iter::FusedIterator;

use tracing::debug;

/// Sync marker of a v1 frame.
pub const V1_SYNC: u8 = 0xFE;
/// Sync marker of a v2 frame.
pub const V2_SYNC: u8 = 0xFD;
/// v1 header: sync, len, seq, sysid, compid, msgid.
pub const V1_HEADER_LEN: usize = 6;
/// v2 header: sync, len, incompat, compat, seq, sysid, compid, msgid (3B LE).
pub const V2_HEADER_LEN: usize = 10;
/// Trailing checksum bytes after every payload. Present, never validated.
pub const CHECKSUM_LEN: usize = 2;
/// Below this many remaining bytes the scan gives up on the buffer.
pub const MIN_SCAN_BYTES: usize = 8;

/// Framing version, identified by the sync marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    V1,
    V2,
}

impl ProtocolVersion {
    /// Classify a sync marker. Any other byte is not a frame start.
    pub fn from_sync(byte: u8) -> Option<Self> {
        match byte {
            V1_SYNC => Some(Self::V1),
            V2_SYNC => Some(Self::V2),
            _ => None,
        }
    }

    pub const fn sync_byte(self) -> u8 {
        match self {
            Self::V1 => V1_SYNC,
            Self::V2 => V2_SYNC,
        }
    }

    pub const fn header_len(self) -> usize {
        match self {
            Self::V1 => V1_HEADER_LEN,
            Self::V2 => V2_HEADER_LEN,
        }
    }

    /// Largest message id the header can carry (8-bit for v1, 24-bit for v2).
    pub const fn max_message_id(self) -> u32 {
        match self {
            Self::V1 => 0xFF,
            Self::V2 => 0x00FF_FFFF,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structurally complete frame located inside a scanned buffer.
///
/// Only ever constructed when `frame_start + total_length() <= buffer.len()`,
/// so every offset it reports is in bounds for the buffer it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    pub version: ProtocolVersion,
    /// Offset of the sync marker in the scanned buffer.
    pub frame_start: usize,
    /// Declared payload size. Always read as 8 bits, also for v2.
    pub payload_length: u8,
    pub sequence: u8,
    pub system_id: u8,
    pub component_id: u8,
    /// 8-bit for v1, full 24-bit value for v2.
    pub message_id: u32,
    /// v2 only; zero for v1 frames.
    pub incompat_flags: u8,
    /// v2 only; zero for v1 frames.
    pub compat_flags: u8,
}

impl FrameDescriptor {
    /// Read the header fields. `header` must hold exactly `version.header_len()` bytes.
    fn from_header(version: ProtocolVersion, frame_start: usize, header: &[u8]) -> Self {
        match version {
            ProtocolVersion::V1 => Self {
                version,
                frame_start,
                payload_length: header[1],
                sequence: header[2],
                system_id: header[3],
                component_id: header[4],
                message_id: u32::from(header[5]),
                incompat_flags: 0,
                compat_flags: 0,
            },
            ProtocolVersion::V2 => Self {
                version,
                frame_start,
                payload_length: header[1],
                incompat_flags: header[2],
                compat_flags: header[3],
                sequence: header[4],
                system_id: header[5],
                component_id: header[6],
                message_id: u32::from(header[7])
                    | (u32::from(header[8]) << 8)
                    | (u32::from(header[9]) << 16),
            },
        }
    }

    pub fn header_length(&self) -> usize {
        self.version.header_len()
    }

    /// Offset of the first payload byte in the scanned buffer.
    pub fn payload_start(&self) -> usize {
        self.frame_start + self.header_length()
    }

    /// Header, payload and checksum together.
    pub fn total_length(&self) -> usize {
        self.header_length() + usize::from(self.payload_length) + CHECKSUM_LEN
    }

    /// Offset one past the last checksum byte; where the next scan step begins.
    pub fn end(&self) -> usize {
        self.frame_start + self.total_length()
    }

    /// The payload bytes of this frame within `buf`.
    ///
    /// Returns `None` if `buf` is not (a prefix-compatible copy of) the
    /// buffer this descriptor was scanned from.
    pub fn payload<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        let start = self.payload_start();
        buf.get(start..start + usize::from(self.payload_length))
    }
}

/// Why a scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanHalt {
    /// Fewer than [`MIN_SCAN_BYTES`] were left; `discarded` trailing bytes were ignored.
    End { discarded: usize },
    /// A sync marker was found but the header did not fit in the buffer.
    TruncatedHeader { offset: usize, available: usize },
    /// The declared frame length ran past the end of the buffer.
    TruncatedFrame {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

impl ScanHalt {
    /// True when a frame start was found but its bytes were incomplete.
    pub fn is_truncation(&self) -> bool {
        !matches!(self, Self::End { .. })
    }
}

/// Iterator over the frames of one buffer, in buffer order.
///
/// ```text
/// noise..  FE len seq sys comp id [payload] ck ck  FD len ic cf seq sys comp id id id [payload] ck ck
///          ^ frame 1                                ^ frame 2 (cursor jumps here, never +1)
/// ```
#[derive(Debug, Clone)]
pub struct FrameScanner<'a> {
    buf: &'a [u8],
    cursor: usize,
    skipped: usize,
    halt: Option<ScanHalt>,
}

/// Start scanning `buf` from offset 0.
pub fn scan(buf: &[u8]) -> FrameScanner<'_> {
    FrameScanner::new(buf)
}

impl<'a> FrameScanner<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            cursor: 0,
            skipped: 0,
            halt: None,
        }
    }

    /// Current scan position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bytes stepped over while looking for a sync marker.
    pub fn skipped_bytes(&self) -> usize {
        self.skipped
    }

    /// Why the scan stopped, once the iterator is exhausted.
    pub fn halt(&self) -> Option<ScanHalt> {
        self.halt
    }

    fn stop(&mut self, halt: ScanHalt) -> Option<FrameDescriptor> {
        match halt {
            ScanHalt::End { .. } => {}
            ScanHalt::TruncatedHeader { offset, available } => {
                debug!(offset, available, "frame header truncated; dropping rest of buffer");
            }
            ScanHalt::TruncatedFrame {
                offset,
                needed,
                available,
            } => {
                debug!(
                    offset,
                    needed, available, "frame exceeds buffer; dropping rest of buffer"
                );
            }
        }
        self.halt = Some(halt);
        None
    }
}

impl Iterator for FrameScanner<'_> {
    type Item = FrameDescriptor;

    fn next(&mut self) -> Option<FrameDescriptor> {
        if self.halt.is_some() {
            return None;
        }

        loop {
            let remaining = self.buf.len() - self.cursor;
            if remaining < MIN_SCAN_BYTES {
                return self.stop(ScanHalt::End {
                    discarded: remaining,
                });
            }

            let Some(version) = ProtocolVersion::from_sync(self.buf[self.cursor]) else {
                self.cursor += 1;
                self.skipped += 1;
                continue;
            };

            let header_len = version.header_len();
            if remaining < header_len {
                return self.stop(ScanHalt::TruncatedHeader {
                    offset: self.cursor,
                    available: remaining,
                });
            }

            let header = &self.buf[self.cursor..self.cursor + header_len];
            let total = header_len + usize::from(header[1]) + CHECKSUM_LEN;
            if remaining < total {
                return self.stop(ScanHalt::TruncatedFrame {
                    offset: self.cursor,
                    needed: total,
                    available: remaining,
                });
            }

            let frame = FrameDescriptor::from_header(version, self.cursor, header);
            self.cursor += total;
            return Some(frame);
        }
    }
}

impl FusedIterator for FrameScanner<'_> {}
