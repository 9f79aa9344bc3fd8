//! Message ids and protocol constants.
//!
//! Ids are compared as full 24-bit values, so a v2 id such as `0x01_001E`
//! never aliases `ATTITUDE`.

pub const HEARTBEAT: u32 = 0;
pub const ATTITUDE: u32 = 30;
pub const GLOBAL_POSITION_INT: u32 = 33;

/// `MAV_AUTOPILOT_ARDUPILOTMEGA`.
pub const MAV_AUTOPILOT_ARDUPILOTMEGA: u8 = 3;
/// `MAV_TYPE_QUADROTOR`.
pub const MAV_TYPE_QUADROTOR: u8 = 2;
/// Bit 7 of `base_mode`.
pub const MAV_MODE_FLAG_SAFETY_ARMED: u8 = 0x80;

pub fn message_name(message_id: u32) -> &'static str {
    match message_id {
        HEARTBEAT => "HEARTBEAT",
        ATTITUDE => "ATTITUDE",
        GLOBAL_POSITION_INT => "GLOBAL_POSITION_INT",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_are_named() {
        assert_eq!(message_name(HEARTBEAT), "HEARTBEAT");
        assert_eq!(message_name(ATTITUDE), "ATTITUDE");
        assert_eq!(message_name(24), "UNKNOWN");
    }

    #[test]
    fn wide_ids_do_not_alias_low_byte() {
        assert_eq!(message_name(0x0100 | ATTITUDE), "UNKNOWN");
        assert_eq!(message_name(0x01_0000), "UNKNOWN");
        assert_eq!(message_name(GLOBAL_POSITION_INT), "GLOBAL_POSITION_INT");
    }
}
