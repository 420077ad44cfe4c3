// Message types published on the hand channels

use serde::{Deserialize, Serialize};

use crate::error::{HandError, Result};

// iRobot calibration request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrateMessage {
    pub utime: i64,
    pub in_jig: bool,
}

// iRobot close command; `valid` selects which of the four motors it applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionCloseMessage {
    pub utime: i64,
    pub valid: [bool; 4],
    pub close_fraction: f64,
}

/// Unified Robotiq command, every driver operation is multiplexed onto it.
/// Flags are 0/1 integers as the gripper expects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RobotiqCommand {
    pub utime: i64,
    pub activate: u8,
    pub emergency_drop: u8,
    pub do_move: u8,
    pub mode: u8,
    pub position: u8,
    pub force: u8,
    pub velocity: u8,
}

/// Payload type carried by a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Calibrate,
    PositionClose,
    RobotiqCommand,
}

/// Any decoded hand message
#[derive(Debug, Clone, PartialEq)]
pub enum HandMessage {
    Calibrate(CalibrateMessage),
    PositionClose(PositionCloseMessage),
    RobotiqCommand(RobotiqCommand),
}

impl HandMessage {
    /// Decode a JSON payload received on `channel`
    pub fn decode(kind: MessageKind, channel: &str, payload: &[u8]) -> Result<Self> {
        let decoded = match kind {
            MessageKind::Calibrate => serde_json::from_slice(payload).map(Self::Calibrate),
            MessageKind::PositionClose => serde_json::from_slice(payload).map(Self::PositionClose),
            MessageKind::RobotiqCommand => {
                serde_json::from_slice(payload).map(Self::RobotiqCommand)
            }
        };
        decoded.map_err(|source| HandError::Decode {
            channel: channel.to_string(),
            source,
        })
    }

    pub fn utime(&self) -> i64 {
        match self {
            Self::Calibrate(m) => m.utime,
            Self::PositionClose(m) => m.utime,
            Self::RobotiqCommand(m) => m.utime,
        }
    }
}
