// Delays, channel names, protocol ranges
use std::time::Duration;

// Robotiq must see deactivate then activate; there is no ack, so we just wait
pub const ACTIVATION_SETTLE_DELAY: Duration = Duration::from_millis(100);

// Gap between the nudge and settle commands of a regrasp
pub const REGRASP_SETTLE_DELAY: Duration = Duration::from_millis(100);

// Regrasp nudges the position back by this many percent when above the threshold
pub const REGRASP_NUDGE_PERCENT: f64 = 2.0;
pub const REGRASP_NUDGE_THRESHOLD: f64 = 1.0;

// Channel naming: {PROTOCOL}_{SIDE}_{COMMAND}
pub const PROTOCOL_IROBOT: &str = "IROBOT";
pub const PROTOCOL_ROBOTIQ: &str = "ROBOTIQ";
pub const CMD_CALIBRATE: &str = "CALIBRATE";
pub const CMD_POSITION_CONTROL_CLOSE: &str = "POSITION_CONTROL_CLOSE";
pub const CMD_COMMAND: &str = "COMMAND";

// Robotiq protocol integer ranges
pub const ROBOTIQ_POSITION_MAX: u8 = 254;
pub const ROBOTIQ_FORCE_MAX: u8 = 255;
pub const ROBOTIQ_VELOCITY_MAX: u8 = 254;
pub const ROBOTIQ_MODE_MAX: u8 = 4;

// iRobot close commands drive the three fingers, never the thumb
pub const IROBOT_CLOSE_VALID_MASK: [bool; 4] = [true, true, true, false];
