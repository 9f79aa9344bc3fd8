use serde::{Deserialize, Serialize};

/// A decoded telemetry event, already converted to display units.
///
/// Serializes to one self-describing JSON record with a `type` tag:
/// ```text
/// {"type":"attitude","roll":90.0,"pitch":0.0,"yaw":0.0}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    Heartbeat(Heartbeat),
    Attitude(Attitude),
    Position(Position),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    pub is_armed: bool,
    pub system_status: u8,
    pub base_mode: u8,
    pub custom_mode: u32,
    pub autopilot: u8,
    pub mavlink_version: u8,
}

/// Vehicle attitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    #[serde(rename = "roll")]
    pub roll_deg: f64,
    #[serde(rename = "pitch")]
    pub pitch_deg: f64,
    #[serde(rename = "yaw")]
    pub yaw_deg: f64,
}

/// Global position: degrees, metres, metres per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "alt")]
    pub alt_m: f64,
    #[serde(rename = "relative_alt")]
    pub relative_alt_m: f64,
    #[serde(rename = "vx")]
    pub vx_mps: f64,
    #[serde(rename = "vy")]
    pub vy_mps: f64,
    #[serde(rename = "vz")]
    pub vz_mps: f64,
    #[serde(rename = "hdg")]
    pub heading_deg: f64,
}

impl TelemetryEvent {
    /// The record's `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Heartbeat(_) => "heartbeat",
            Self::Attitude(_) => "attitude",
            Self::Position(_) => "position",
        }
    }

    /// Serialize to the outbound JSON record.
    pub fn to_record(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse an outbound JSON record back into an event.
    pub fn from_record(record: &str) -> serde_json::Result<Self> {
        serde_json::from_str(record)
    }
}

impl From<Heartbeat> for TelemetryEvent {
    fn from(value: Heartbeat) -> Self {
        Self::Heartbeat(value)
    }
}

impl From<Attitude> for TelemetryEvent {
    fn from(value: Attitude) -> Self {
        Self::Attitude(value)
    }
}

impl From<Position> for TelemetryEvent {
    fn from(value: Position) -> Self {
        Self::Position(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn heartbeat_record_shape() {
        let event = TelemetryEvent::from(Heartbeat {
            is_armed: true,
            system_status: 4,
            base_mode: 0x81,
            custom_mode: 5,
            autopilot: 3,
            mavlink_version: 3,
        });

        let value: serde_json::Value = serde_json::from_str(&event.to_record().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "heartbeat",
                "is_armed": true,
                "system_status": 4,
                "base_mode": 129,
                "custom_mode": 5,
                "autopilot": 3,
                "mavlink_version": 3
            })
        );
    }

    #[test]
    fn attitude_record_uses_short_field_names() {
        let event = TelemetryEvent::from(Attitude {
            roll_deg: 90.0,
            pitch_deg: -10.5,
            yaw_deg: 0.0,
        });

        let value: serde_json::Value = serde_json::from_str(&event.to_record().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"type": "attitude", "roll": 90.0, "pitch": -10.5, "yaw": 0.0})
        );
    }

    #[test]
    fn position_record_shape() {
        let event = TelemetryEvent::from(Position {
            lat: 12.5,
            lon: -3.25,
            alt_m: 1.5,
            relative_alt_m: 0.5,
            vx_mps: 1.0,
            vy_mps: -1.0,
            vz_mps: 0.0,
            heading_deg: 270.0,
        });

        let value: serde_json::Value = serde_json::from_str(&event.to_record().unwrap()).unwrap();
        assert_eq!(value["type"], "position");
        assert_eq!(value["alt"], 1.5);
        assert_eq!(value["relative_alt"], 0.5);
        assert_eq!(value["hdg"], 270.0);
        assert!(value.get("alt_m").is_none());
        assert_eq!(value.as_object().unwrap().len(), 9);
    }

    #[test]
    fn record_parses_back() {
        let record = r#"{"type":"attitude","roll":1.0,"pitch":2.0,"yaw":3.0}"#;
        let event = TelemetryEvent::from_record(record).unwrap();
        assert_eq!(event.kind(), "attitude");
        assert!(TelemetryEvent::from_record(r#"{"type":"gps_raw"}"#).is_err());
    }
}
