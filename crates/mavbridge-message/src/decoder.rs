use std::f64::consts::PI;

use mavbridge_frame::FrameDescriptor;
use tracing::trace;

use crate::event::{Attitude, Heartbeat, Position, TelemetryEvent};
use crate::ids::{
    ATTITUDE, GLOBAL_POSITION_INT, HEARTBEAT, MAV_AUTOPILOT_ARDUPILOTMEGA,
    MAV_MODE_FLAG_SAFETY_ARMED, MAV_TYPE_QUADROTOR,
};
use crate::raw::{RawAttitude, RawGlobalPosition, RawHeartbeat};

/// Heartbeats are relayed only from senders matching both fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatFilter {
    pub autopilot: u8,
    pub vehicle_type: u8,
}

impl Default for HeartbeatFilter {
    fn default() -> Self {
        Self {
            autopilot: MAV_AUTOPILOT_ARDUPILOTMEGA,
            vehicle_type: MAV_TYPE_QUADROTOR,
        }
    }
}

impl HeartbeatFilter {
    fn accepts(&self, raw: &RawHeartbeat) -> bool {
        raw.autopilot == self.autopilot && raw.vehicle_type == self.vehicle_type
    }
}

/// Configuration for the message decoder.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// `None` relays every heartbeat. Default: ArduPilot quadrotors only.
    pub heartbeat_filter: Option<HeartbeatFilter>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            heartbeat_filter: Some(HeartbeatFilter::default()),
        }
    }
}

impl DecoderConfig {
    /// Relay heartbeats from any sender.
    pub fn unfiltered() -> Self {
        Self {
            heartbeat_filter: None,
        }
    }
}

/// What became of one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decode {
    Event(TelemetryEvent),
    /// Not one of the decoded message kinds.
    Unrecognized { message_id: u32 },
    /// Known kind, but the payload is shorter than its fixed layout.
    Undersized {
        message_id: u32,
        needed: usize,
        actual: usize,
    },
    /// A heartbeat rejected by the heartbeat filter.
    Filtered,
}

impl Decode {
    pub fn into_event(self) -> Option<TelemetryEvent> {
        match self {
            Self::Event(event) => Some(event),
            _ => None,
        }
    }
}

/// Turns frames into telemetry events.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode `frame` from the buffer it was scanned from.
    pub fn decode(&self, frame: &FrameDescriptor, buf: &[u8]) -> Option<TelemetryEvent> {
        self.classify(frame, buf).into_event()
    }

    /// Decode `frame` and report why no event was produced, if none was.
    ///
    /// Reads stay within `[payload_start, payload_start + payload_length)`.
    pub fn classify(&self, frame: &FrameDescriptor, buf: &[u8]) -> Decode {
        let message_id = frame.message_id;
        let payload = frame.payload(buf).unwrap_or_default();

        match message_id {
            HEARTBEAT => match RawHeartbeat::parse(payload) {
                Some(raw) => self.heartbeat(&raw),
                None => undersized(message_id, RawHeartbeat::LEN, payload),
            },
            ATTITUDE => match RawAttitude::parse(payload) {
                Some(raw) => Decode::Event(attitude(&raw)),
                None => undersized(message_id, RawAttitude::LEN, payload),
            },
            GLOBAL_POSITION_INT => match RawGlobalPosition::parse(payload) {
                Some(raw) => Decode::Event(position(&raw)),
                None => undersized(message_id, RawGlobalPosition::LEN, payload),
            },
            _ => Decode::Unrecognized { message_id },
        }
    }

    fn heartbeat(&self, raw: &RawHeartbeat) -> Decode {
        if let Some(filter) = &self.config.heartbeat_filter {
            if !filter.accepts(raw) {
                trace!(
                    autopilot = raw.autopilot,
                    vehicle_type = raw.vehicle_type,
                    "heartbeat filtered"
                );
                return Decode::Filtered;
            }
        }
        Decode::Event(TelemetryEvent::Heartbeat(Heartbeat {
            is_armed: (raw.base_mode & MAV_MODE_FLAG_SAFETY_ARMED) != 0,
            system_status: raw.system_status,
            base_mode: raw.base_mode,
            custom_mode: raw.custom_mode,
            autopilot: raw.autopilot,
            mavlink_version: raw.mavlink_version,
        }))
    }
}

fn undersized(message_id: u32, needed: usize, payload: &[u8]) -> Decode {
    trace!(
        message_id,
        needed,
        actual = payload.len(),
        "payload too short to decode"
    );
    Decode::Undersized {
        message_id,
        needed,
        actual: payload.len(),
    }
}

fn attitude(raw: &RawAttitude) -> TelemetryEvent {
    TelemetryEvent::Attitude(Attitude {
        roll_deg: rad_to_deg(raw.roll),
        pitch_deg: rad_to_deg(raw.pitch),
        yaw_deg: rad_to_deg(raw.yaw),
    })
}

fn position(raw: &RawGlobalPosition) -> TelemetryEvent {
    TelemetryEvent::Position(Position {
        lat: f64::from(raw.lat) / 1e7,
        lon: f64::from(raw.lon) / 1e7,
        alt_m: f64::from(raw.alt) / 1000.0,
        relative_alt_m: f64::from(raw.relative_alt) / 1000.0,
        vx_mps: f64::from(raw.vx) / 100.0,
        vy_mps: f64::from(raw.vy) / 100.0,
        vz_mps: f64::from(raw.vz) / 100.0,
        heading_deg: f64::from(raw.hdg) / 100.0,
    })
}

fn rad_to_deg(rad: f32) -> f64 {
    f64::from(rad) * 180.0 / PI
}
