//! Wire-level payload structs, fields exactly as transmitted.
//!
//! All fields are little-endian at fixed offsets from the payload start.
//! `parse` only looks at the first `LEN` bytes; any extra payload bytes
//! before the checksum are ignored.

use bytes::{Buf, BufMut, BytesMut};

/// `HEARTBEAT` (id 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawHeartbeat {
    pub custom_mode: u32,
    /// `MAV_TYPE` of the sender (`type` on the wire).
    pub vehicle_type: u8,
    pub autopilot: u8,
    pub base_mode: u8,
    pub system_status: u8,
    pub mavlink_version: u8,
}

impl RawHeartbeat {
    pub const LEN: usize = 9;

    pub fn parse(payload: &[u8]) -> Option<Self> {
        if payload.len() < Self::LEN {
            return None;
        }
        let mut buf = &payload[..Self::LEN];
        Some(Self {
            custom_mode: buf.get_u32_le(),
            vehicle_type: buf.get_u8(),
            autopilot: buf.get_u8(),
            base_mode: buf.get_u8(),
            system_status: buf.get_u8(),
            mavlink_version: buf.get_u8(),
        })
    }

    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(Self::LEN);
        dst.put_u32_le(self.custom_mode);
        dst.put_u8(self.vehicle_type);
        dst.put_u8(self.autopilot);
        dst.put_u8(self.base_mode);
        dst.put_u8(self.system_status);
        dst.put_u8(self.mavlink_version);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(Self::LEN);
        self.encode(&mut buf);
        buf.to_vec()
    }
}

/// `ATTITUDE` (id 30). Angles in radians, rates in rad/s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawAttitude {
    pub time_boot_ms: u32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub rollspeed: f32,
    pub pitchspeed: f32,
    pub yawspeed: f32,
}

impl RawAttitude {
    pub const LEN: usize = 28;

    pub fn parse(payload: &[u8]) -> Option<Self> {
        if payload.len() < Self::LEN {
            return None;
        }
        let mut buf = &payload[..Self::LEN];
        Some(Self {
            time_boot_ms: buf.get_u32_le(),
            roll: buf.get_f32_le(),
            pitch: buf.get_f32_le(),
            yaw: buf.get_f32_le(),
            rollspeed: buf.get_f32_le(),
            pitchspeed: buf.get_f32_le(),
            yawspeed: buf.get_f32_le(),
        })
    }

    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(Self::LEN);
        dst.put_u32_le(self.time_boot_ms);
        dst.put_f32_le(self.roll);
        dst.put_f32_le(self.pitch);
        dst.put_f32_le(self.yaw);
        dst.put_f32_le(self.rollspeed);
        dst.put_f32_le(self.pitchspeed);
        dst.put_f32_le(self.yawspeed);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(Self::LEN);
        self.encode(&mut buf);
        buf.to_vec()
    }
}

/// `GLOBAL_POSITION_INT` (id 33).
///
/// `lat`/`lon` in 1e-7 degrees, altitudes in mm, velocities in cm/s,
/// heading in centidegrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawGlobalPosition {
    pub time_boot_ms: u32,
    pub lat: i32,
    pub lon: i32,
    pub alt: i32,
    pub relative_alt: i32,
    pub vx: i16,
    pub vy: i16,
    pub vz: i16,
    pub hdg: u16,
}

impl RawGlobalPosition {
    pub const LEN: usize = 28;

    pub fn parse(payload: &[u8]) -> Option<Self> {
        if payload.len() < Self::LEN {
            return None;
        }
        let mut buf = &payload[..Self::LEN];
        Some(Self {
            time_boot_ms: buf.get_u32_le(),
            lat: buf.get_i32_le(),
            lon: buf.get_i32_le(),
            alt: buf.get_i32_le(),
            relative_alt: buf.get_i32_le(),
            vx: buf.get_i16_le(),
            vy: buf.get_i16_le(),
            vz: buf.get_i16_le(),
            hdg: buf.get_u16_le(),
        })
    }

    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(Self::LEN);
        dst.put_u32_le(self.time_boot_ms);
        dst.put_i32_le(self.lat);
        dst.put_i32_le(self.lon);
        dst.put_i32_le(self.alt);
        dst.put_i32_le(self.relative_alt);
        dst.put_i16_le(self.vx);
        dst.put_i16_le(self.vy);
        dst.put_i16_le(self.vz);
        dst.put_u16_le(self.hdg);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(Self::LEN);
        self.encode(&mut buf);
        buf.to_vec()
    }
}
