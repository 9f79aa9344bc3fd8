#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::{Command, Output};

use bytes::BytesMut;
use mavbridge_frame::{encode_frame, FrameHeader, ProtocolVersion};
use mavbridge_message::{RawAttitude, RawHeartbeat, ATTITUDE, HEARTBEAT};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "mavcli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn mavbridge(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mavbridge"))
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("mavbridge should run")
}

fn capture() -> Vec<u8> {
    let mut buf = BytesMut::from(&[0xAA, 0x55][..]);
    let header = FrameHeader {
        system_id: 1,
        component_id: 1,
        message_id: ATTITUDE,
        ..FrameHeader::default()
    };
    let attitude = RawAttitude {
        roll: std::f32::consts::FRAC_PI_2,
        ..RawAttitude::default()
    };
    encode_frame(ProtocolVersion::V1, &header, &attitude.to_bytes(), &mut buf)
        .expect("frame should encode");

    // A ground station heartbeat: rejected by the default filter.
    let gcs = RawHeartbeat {
        vehicle_type: 6,
        autopilot: 8,
        ..RawHeartbeat::default()
    };
    let header = FrameHeader {
        message_id: HEARTBEAT,
        ..header
    };
    encode_frame(ProtocolVersion::V2, &header, &gcs.to_bytes(), &mut buf)
        .expect("frame should encode");

    // Trailing partial frame.
    buf.extend_from_slice(&[0xFE, 28, 0, 1, 1, 30, 0, 0]);
    buf.to_vec()
}

fn last_json_line(bytes: &[u8]) -> serde_json::Value {
    let text = String::from_utf8_lossy(bytes);
    let line = text.lines().last().expect("output should not be empty");
    serde_json::from_str(line).expect("line should be json")
}

#[test]
fn decode_prints_events_and_summary() {
    let dir = unique_temp_dir("decode");
    let file = dir.join("capture.bin");
    std::fs::write(&file, capture()).expect("capture should be writable");

    let output = mavbridge(&["--format", "json", "decode", file.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "unexpected stdout: {stdout}");
    let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(event["type"], "attitude");
    assert!((event["roll"].as_f64().unwrap() - 90.0).abs() < 1e-4);

    let summary = last_json_line(&output.stderr);
    assert_eq!(summary["frames"], 2);
    assert_eq!(summary["events"], 1);
    assert_eq!(summary["filtered"], 1);
    assert_eq!(summary["truncations"], 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_all_heartbeats_passes_filtered_heartbeat() {
    let dir = unique_temp_dir("decode-all");
    let file = dir.join("capture.bin");
    std::fs::write(&file, capture()).expect("capture should be writable");

    let output = mavbridge(&[
        "--format",
        "json",
        "decode",
        file.to_str().unwrap(),
        "--all-heartbeats",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.contains(r#""type":"heartbeat""#));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_hex_text() {
    let dir = unique_temp_dir("decode-hex");
    let file = dir.join("capture.hex");
    let hex: String = capture()
        .iter()
        .map(|byte| format!("{byte:02x} "))
        .collect();
    std::fs::write(&file, hex).expect("capture should be writable");

    let output = mavbridge(&["--format", "json", "decode", "--hex", file.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(r#""type":"attitude""#));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_rejects_malformed_hex() {
    let dir = unique_temp_dir("decode-badhex");
    let file = dir.join("capture.hex");
    std::fs::write(&file, "fe 1").expect("capture should be writable");

    let output = mavbridge(&["decode", "--hex", file.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_missing_file_fails() {
    let output = mavbridge(&["decode", "/nonexistent/mavbridge/capture.bin"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed reading"));
}

#[test]
fn version_reports_package_version() {
    let output = mavbridge(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("mavbridge {}", env!("CARGO_PKG_VERSION"))
    );
}
