// iRobot hand driver: calibration and finger open/close

use parking_lot::Mutex;
use tracing::info;

use super::{HandDriver, Side, channel, scale};
use crate::config::{
    CMD_CALIBRATE, CMD_POSITION_CONTROL_CLOSE, IROBOT_CLOSE_VALID_MASK, PROTOCOL_IROBOT,
};
use crate::error::Result;
use crate::messages::{CalibrateMessage, MessageKind, PositionCloseMessage};
use crate::transport::{Transport, publish_message};
use crate::utime;

pub struct IRobotHandDriver<T: Transport> {
    side: Side,
    transport: T,
    calibrate_channel: String,
    close_channel: String,
    lock: Mutex<()>,
}

impl<T: Transport> IRobotHandDriver<T> {
    pub fn new(side: Side, transport: T) -> Self {
        Self {
            side,
            transport,
            calibrate_channel: channel(PROTOCOL_IROBOT, side, CMD_CALIBRATE),
            close_channel: channel(PROTOCOL_IROBOT, side, CMD_POSITION_CONTROL_CLOSE),
            lock: Mutex::new(()),
        }
    }

    /// Create from a side name ("left" / "right")
    pub fn from_side_name(side: &str, transport: T) -> Result<Self> {
        Ok(Self::new(side.parse()?, transport))
    }

    /// Request calibration, optionally with the hand mounted in its jig
    pub fn send_calibrate_with_jig(&self, with_jig: bool) -> Result<()> {
        let _guard = self.lock.lock();
        info!("iRobot {} calibrate (in_jig={})", self.side, with_jig);
        let msg = CalibrateMessage {
            utime: utime::now(),
            in_jig: with_jig,
        };
        publish_message(&self.transport, &self.calibrate_channel, &msg)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> HandDriver for IRobotHandDriver<T> {
    fn side(&self) -> Side {
        self.side
    }

    fn channels(&self) -> Vec<(String, MessageKind)> {
        vec![
            (self.calibrate_channel.clone(), MessageKind::Calibrate),
            (self.close_channel.clone(), MessageKind::PositionClose),
        ]
    }

    /// Calibrate in the jig
    fn send_calibrate(&self) -> Result<()> {
        self.send_calibrate_with_jig(true)
    }

    fn send_close(&self, percentage: f64) -> Result<()> {
        let percentage = scale::check_percentage("percentage", percentage)?;
        let _guard = self.lock.lock();
        info!("iRobot {} close {}%", self.side, percentage);
        let msg = PositionCloseMessage {
            utime: utime::now(),
            valid: IROBOT_CLOSE_VALID_MASK,
            close_fraction: percentage / 100.0,
        };
        publish_message(&self.transport, &self.close_channel, &msg)
    }
}
