use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use mavbridge_frame::FrameDescriptor;
use mavbridge_message::{message_name, TelemetryEvent};
use mavbridge_relay::CounterSnapshot;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    /// One JSON record per line, exactly as subscribers receive it.
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Frame provenance shown next to an event, when known.
#[derive(Debug, Clone, Copy)]
pub struct Origin {
    pub offset: usize,
    pub version: &'static str,
    pub system_id: u8,
    pub component_id: u8,
    pub sequence: u8,
    pub message_id: u32,
}

impl From<&FrameDescriptor> for Origin {
    fn from(frame: &FrameDescriptor) -> Self {
        Self {
            offset: frame.frame_start,
            version: frame.version.as_str(),
            system_id: frame.system_id,
            component_id: frame.component_id,
            sequence: frame.sequence,
            message_id: frame.message_id,
        }
    }
}

pub fn print_event(event: &TelemetryEvent, origin: Option<Origin>, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", record_line(event)),
        OutputFormat::Pretty => println!("{}", pretty_line(event, origin)),
        OutputFormat::Table => {
            let mut table = events_table();
            table.add_row(table_row(event, origin));
            println!("{table}");
        }
    }
}

/// Print a batch; table output gets a single table for the whole batch.
pub fn print_events(events: &[(TelemetryEvent, Option<Origin>)], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if events.is_empty() {
                return;
            }
            let mut table = events_table();
            for (event, origin) in events {
                table.add_row(table_row(event, *origin));
            }
            println!("{table}");
        }
        _ => {
            for (event, origin) in events {
                print_event(event, *origin, format);
            }
        }
    }
}

/// Counter summary on stderr, keeping stdout for events.
pub fn print_summary(snapshot: &CounterSnapshot, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            eprintln!(
                "{}",
                serde_json::to_string(snapshot).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COUNTER", "VALUE"]);
            for (name, value) in summary_fields(snapshot) {
                table.add_row(vec![name.to_string(), value.to_string()]);
            }
            eprintln!("{table}");
        }
        OutputFormat::Pretty => {
            let line = summary_fields(snapshot)
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            eprintln!("{line}");
        }
    }
}

fn summary_fields(s: &CounterSnapshot) -> [(&'static str, u64); 8] {
    [
        ("datagrams", s.datagrams),
        ("bytes", s.bytes),
        ("frames", s.frames),
        ("events", s.events),
        ("truncations", s.truncations),
        ("unrecognized", s.unrecognized),
        ("undersized", s.undersized),
        ("filtered", s.filtered),
    ]
}

fn record_line(event: &TelemetryEvent) -> String {
    event.to_record().unwrap_or_else(|_| "{}".to_string())
}

fn events_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["OFFSET", "VER", "SYS/COMP", "SEQ", "MESSAGE", "FIELDS"]);
    table
}

fn table_row(event: &TelemetryEvent, origin: Option<Origin>) -> Vec<String> {
    let dash = || "-".to_string();
    match origin {
        Some(o) => vec![
            o.offset.to_string(),
            o.version.to_string(),
            format!("{}/{}", o.system_id, o.component_id),
            o.sequence.to_string(),
            message_name(o.message_id).to_string(),
            fields(event),
        ],
        None => vec![
            dash(),
            dash(),
            dash(),
            dash(),
            event.kind().to_string(),
            fields(event),
        ],
    }
}

fn pretty_line(event: &TelemetryEvent, origin: Option<Origin>) -> String {
    match origin {
        Some(o) => format!(
            "[{} {}/{} seq={}] {:<9} {}",
            o.version,
            o.system_id,
            o.component_id,
            o.sequence,
            event.kind(),
            fields(event)
        ),
        None => format!("{:<9} {}", event.kind(), fields(event)),
    }
}

fn fields(event: &TelemetryEvent) -> String {
    match event {
        TelemetryEvent::Heartbeat(hb) => format!(
            "armed={} status={} mode=0x{:02x} custom={} autopilot={} mavlink={}",
            hb.is_armed,
            hb.system_status,
            hb.base_mode,
            hb.custom_mode,
            hb.autopilot,
            hb.mavlink_version
        ),
        TelemetryEvent::Attitude(att) => format!(
            "roll={:.2} pitch={:.2} yaw={:.2}",
            att.roll_deg, att.pitch_deg, att.yaw_deg
        ),
        TelemetryEvent::Position(pos) => format!(
            "lat={:.7} lon={:.7} alt={:.3} rel_alt={:.3} vel=({:.2},{:.2},{:.2}) hdg={:.2}",
            pos.lat,
            pos.lon,
            pos.alt_m,
            pos.relative_alt_m,
            pos.vx_mps,
            pos.vy_mps,
            pos.vz_mps,
            pos.heading_deg
        ),
    }
}

#[cfg(test)]
mod tests {
    use mavbridge_message::{Attitude, Heartbeat};

    use super::*;

    #[test]
    fn pretty_line_includes_origin() {
        let event = TelemetryEvent::Attitude(Attitude {
            roll_deg: 90.0,
            pitch_deg: 0.0,
            yaw_deg: -45.5,
        });
        let origin = Origin {
            offset: 1,
            version: "v1",
            system_id: 1,
            component_id: 2,
            sequence: 7,
            message_id: 30,
        };

        let line = pretty_line(&event, Some(origin));
        assert!(line.starts_with("[v1 1/2 seq=7] attitude"));
        assert!(line.ends_with("roll=90.00 pitch=0.00 yaw=-45.50"));
    }

    #[test]
    fn heartbeat_fields_show_mode_in_hex() {
        let event = TelemetryEvent::Heartbeat(Heartbeat {
            is_armed: true,
            system_status: 4,
            base_mode: 0x81,
            custom_mode: 0,
            autopilot: 3,
            mavlink_version: 3,
        });
        assert!(fields(&event).contains("mode=0x81"));
        assert_eq!(table_row(&event, None)[4], "heartbeat");
    }

    #[test]
    fn json_line_is_the_subscriber_record() {
        let event = TelemetryEvent::Attitude(Attitude {
            roll_deg: 0.0,
            pitch_deg: 0.0,
            yaw_deg: 0.0,
        });
        assert_eq!(
            record_line(&event),
            r#"{"type":"attitude","roll":0.0,"pitch":0.0,"yaw":0.0}"#
        );
    }
}
