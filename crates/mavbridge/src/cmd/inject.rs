use std::thread;

use bytes::BytesMut;
use mavbridge_frame::{encode_frame, FrameHeader, ProtocolVersion};
use mavbridge_message::{
    RawAttitude, RawGlobalPosition, RawHeartbeat, ATTITUDE, GLOBAL_POSITION_INT, HEARTBEAT,
    MAV_AUTOPILOT_ARDUPILOTMEGA, MAV_MODE_FLAG_SAFETY_ARMED, MAV_TYPE_QUADROTOR,
};
use mavbridge_transport::DatagramSender;
use tracing::{debug, info};

use crate::cmd::{parse_duration, InjectArgs, InjectKind, Protocol};
use crate::exit::{frame_error, transport_error, CliResult, SUCCESS};

/// MAV_STATE_ACTIVE.
const SYSTEM_STATUS_ACTIVE: u8 = 4;
const COMPONENT_AUTOPILOT: u8 = 1;

pub fn run(args: InjectArgs) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let sender =
        DatagramSender::connect(args.addr).map_err(|err| transport_error("connect failed", err))?;

    let mut sequence = 0u8;
    for round in 0..args.count {
        if round > 0 && !interval.is_zero() {
            thread::sleep(interval);
        }
        let datagram = build_datagram(&args, round, &mut sequence)?;
        let sent = sender
            .send(&datagram)
            .map_err(|err| transport_error("send failed", err))?;
        debug!(round, bytes = sent, "datagram sent");
    }

    info!(
        datagrams = args.count,
        target = %sender.target(),
        "injection finished"
    );
    Ok(SUCCESS)
}

fn build_datagram(args: &InjectArgs, round: u32, sequence: &mut u8) -> CliResult<Vec<u8>> {
    let version = match args.protocol {
        Protocol::V1 => ProtocolVersion::V1,
        Protocol::V2 => ProtocolVersion::V2,
    };
    let wants = |kind: InjectKind| args.kind == InjectKind::All || args.kind == kind;

    let mut buf = BytesMut::new();
    let mut push = |message_id: u32, payload: Vec<u8>| -> CliResult<()> {
        let header = FrameHeader {
            sequence: *sequence,
            system_id: args.system_id,
            component_id: COMPONENT_AUTOPILOT,
            message_id,
            ..FrameHeader::default()
        };
        *sequence = sequence.wrapping_add(1);
        encode_frame(version, &header, &payload, &mut buf)
            .map_err(|err| frame_error("frame build failed", err))
    };

    if wants(InjectKind::Heartbeat) {
        push(HEARTBEAT, synthetic_heartbeat(args.armed).to_bytes())?;
    }
    if wants(InjectKind::Attitude) {
        push(ATTITUDE, synthetic_attitude(round).to_bytes())?;
    }
    if wants(InjectKind::Position) {
        push(GLOBAL_POSITION_INT, synthetic_position(round).to_bytes())?;
    }

    Ok(buf.to_vec())
}

fn synthetic_heartbeat(armed: bool) -> RawHeartbeat {
    RawHeartbeat {
        custom_mode: 0,
        vehicle_type: MAV_TYPE_QUADROTOR,
        autopilot: MAV_AUTOPILOT_ARDUPILOTMEGA,
        base_mode: if armed { MAV_MODE_FLAG_SAFETY_ARMED } else { 0 },
        system_status: SYSTEM_STATUS_ACTIVE,
        mavlink_version: 3,
    }
}

/// A slow yaw sweep with a little roll.
fn synthetic_attitude(round: u32) -> RawAttitude {
    let t = round as f32;
    RawAttitude {
        time_boot_ms: round.wrapping_mul(100),
        roll: 0.05 * (t * 0.3).sin(),
        pitch: 0.0,
        yaw: (t * 0.1) % std::f32::consts::TAU,
        yawspeed: 0.1,
        ..RawAttitude::default()
    }
}

/// Drifting north-east from a fixed home point at 10 m.
fn synthetic_position(round: u32) -> RawGlobalPosition {
    let step = i32::try_from(round).unwrap_or(i32::MAX).saturating_mul(10);
    RawGlobalPosition {
        time_boot_ms: round.wrapping_mul(100),
        lat: 473_977_420i32.saturating_add(step),
        lon: 85_455_940i32.saturating_add(step),
        alt: 498_000,
        relative_alt: 10_000,
        vx: 50,
        vy: 50,
        vz: 0,
        hdg: 4_500,
    }
}
