// Hand drivers: translate gesture commands into bus messages
//
// Provides:
// - Side and channel naming ({PROTOCOL}_{SIDE}_{COMMAND})
// - Percentage validation and rescaling to protocol integers
// - iRobot and Robotiq drivers behind a common HandDriver trait
//
// Each driver serializes its own calls, so the two-message sequences
// (Robotiq calibrate, regrasp) are never interleaved with another command
// from the same instance. Separate instances share nothing.

mod irobot;
mod robotiq;
pub mod scale;

use std::fmt;
use std::str::FromStr;

pub use irobot::IRobotHandDriver;
pub use robotiq::RobotiqHandDriver;

use crate::error::{HandError, Result};
use crate::messages::MessageKind;

/// Which hand a driver controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Upper-cased name used in channel names
    pub fn as_upper(&self) -> &'static str {
        match self {
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

impl FromStr for Side {
    type Err = HandError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            _ => Err(HandError::InvalidSide(s.to_string())),
        }
    }
}

/// Build a channel name, e.g. `ROBOTIQ_LEFT_COMMAND`
pub fn channel(protocol: &str, side: Side, command: &str) -> String {
    format!("{}_{}_{}", protocol, side.as_upper(), command)
}

/// Gesture-level commands every hand understands
pub trait HandDriver {
    fn side(&self) -> Side;

    /// Channels this driver publishes on, with their payload types
    fn channels(&self) -> Vec<(String, MessageKind)>;

    fn send_calibrate(&self) -> Result<()>;

    /// Close by `percentage` in [0, 100]
    fn send_close(&self, percentage: f64) -> Result<()>;

    /// Open by `percentage` in [0, 100]; opening p% is closing (100 - p)%
    fn send_open(&self, percentage: f64) -> Result<()> {
        scale::check_percentage("percentage", percentage)?;
        self.send_close(100.0 - percentage)
    }
}
