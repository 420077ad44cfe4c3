// Robotiq gripper driver
//
// Every operation publishes a RobotiqCommand on ROBOTIQ_{SIDE}_COMMAND;
// operations differ only in which fields they set.
//
// Calibrate and regrasp are two-message sequences separated by a fixed
// blocking sleep. The gripper never acknowledges, so once the first message
// is out the second is always sent. The per-instance lock is held across the
// whole sequence; another call on the same driver waits until it is done.

use std::thread::sleep;

use parking_lot::Mutex;
use tracing::info;

use super::{HandDriver, Side, channel, scale};
use crate::config::{
    ACTIVATION_SETTLE_DELAY, CMD_COMMAND, PROTOCOL_ROBOTIQ, REGRASP_NUDGE_PERCENT,
    REGRASP_NUDGE_THRESHOLD, REGRASP_SETTLE_DELAY, ROBOTIQ_FORCE_MAX, ROBOTIQ_POSITION_MAX,
    ROBOTIQ_VELOCITY_MAX,
};
use crate::error::Result;
use crate::messages::{MessageKind, RobotiqCommand};
use crate::transport::{Transport, publish_message};
use crate::utime;

pub struct RobotiqHandDriver<T: Transport> {
    side: Side,
    transport: T,
    command_channel: String,
    lock: Mutex<()>,
}

impl<T: Transport> RobotiqHandDriver<T> {
    pub fn new(side: Side, transport: T) -> Self {
        Self {
            side,
            transport,
            command_channel: channel(PROTOCOL_ROBOTIQ, side, CMD_COMMAND),
            lock: Mutex::new(()),
        }
    }

    /// Create from a side name ("left" / "right")
    pub fn from_side_name(side: &str, transport: T) -> Result<Self> {
        Ok(Self::new(side.parse()?, transport))
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn publish(&self, cmd: &RobotiqCommand) -> Result<()> {
        publish_message(&self.transport, &self.command_channel, cmd)
    }

    /// Emergency release, no delay
    pub fn send_drop(&self) -> Result<()> {
        let _guard = self.lock.lock();
        info!("Robotiq {} emergency drop", self.side);
        self.publish(&RobotiqCommand {
            utime: utime::now(),
            emergency_drop: 1,
            do_move: 0,
            ..Default::default()
        })
    }

    /// Move with explicit position/force/velocity percentages and grasp mode
    pub fn send_custom(&self, position: f64, force: f64, velocity: f64, mode: i32) -> Result<()> {
        let cmd = custom_command(position, force, velocity, mode)?;
        let _guard = self.lock.lock();
        info!(
            "Robotiq {} custom: position={}% force={}% velocity={}% mode={}",
            self.side, position, force, velocity, mode
        );
        self.publish(&stamped(cmd))
    }

    /// Nudge the grip open slightly, wait, then settle at `position`
    ///
    /// Above 1% the nudge step targets `position - 2`; at or below it the
    /// first step repeats `position`. Both steps are validated up front so a
    /// rejected regrasp publishes nothing.
    pub fn send_regrasp(&self, position: f64, force: f64, velocity: f64, mode: i32) -> Result<()> {
        let nudge_position = if position > REGRASP_NUDGE_THRESHOLD {
            position - REGRASP_NUDGE_PERCENT
        } else {
            position
        };
        let nudge = custom_command(nudge_position, force, velocity, mode)?;
        let settle = custom_command(position, force, velocity, mode)?;

        let _guard = self.lock.lock();
        info!(
            "Robotiq {} regrasp: {}% -> {}%",
            self.side, nudge_position, position
        );
        self.publish(&stamped(nudge))?;
        sleep(REGRASP_SETTLE_DELAY);
        self.publish(&stamped(settle))
    }

    /// Switch grasp mode without moving
    pub fn set_mode(&self, mode: i32) -> Result<()> {
        let mode = scale::check_mode(mode)?;
        let _guard = self.lock.lock();
        info!("Robotiq {} set mode {}", self.side, mode);
        self.publish(&RobotiqCommand {
            utime: utime::now(),
            activate: 1,
            do_move: 0,
            mode,
            ..Default::default()
        })
    }
}

impl<T: Transport> HandDriver for RobotiqHandDriver<T> {
    fn side(&self) -> Side {
        self.side
    }

    fn channels(&self) -> Vec<(String, MessageKind)> {
        vec![(self.command_channel.clone(), MessageKind::RobotiqCommand)]
    }

    /// Deactivate, wait, then activate the same zeroed command
    fn send_calibrate(&self) -> Result<()> {
        let _guard = self.lock.lock();
        info!("Robotiq {} calibrate (deactivate/activate)", self.side);
        let mut cmd = RobotiqCommand {
            utime: utime::now(),
            ..Default::default()
        };
        self.publish(&cmd)?;

        sleep(ACTIVATION_SETTLE_DELAY);
        cmd.activate = 1;
        self.publish(&cmd)
    }

    /// Close at full force and speed; only position follows `percentage`
    fn send_close(&self, percentage: f64) -> Result<()> {
        let position = scale::percent_to_raw("percentage", percentage, ROBOTIQ_POSITION_MAX)?;
        let _guard = self.lock.lock();
        info!("Robotiq {} close {}%", self.side, percentage);
        self.publish(&RobotiqCommand {
            utime: utime::now(),
            activate: 1,
            emergency_drop: 0,
            do_move: 1,
            mode: 0,
            position,
            force: ROBOTIQ_FORCE_MAX,
            velocity: ROBOTIQ_VELOCITY_MAX,
        })
    }
}

/// Validate and rescale a custom move; utime is filled at send time
fn custom_command(position: f64, force: f64, velocity: f64, mode: i32) -> Result<RobotiqCommand> {
    Ok(RobotiqCommand {
        utime: 0,
        activate: 1,
        emergency_drop: 0,
        do_move: 1,
        position: scale::percent_to_raw("position", position, ROBOTIQ_POSITION_MAX)?,
        force: scale::percent_to_raw("force", force, ROBOTIQ_FORCE_MAX)?,
        velocity: scale::percent_to_raw("velocity", velocity, ROBOTIQ_VELOCITY_MAX)?,
        mode: scale::check_mode(mode)?,
    })
}

fn stamped(cmd: RobotiqCommand) -> RobotiqCommand {
    RobotiqCommand {
        utime: utime::now(),
        ..cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandError;
    use crate::transport::MemoryTransport;
    use std::sync::Arc;
    use std::thread;

    fn driver(side: Side) -> RobotiqHandDriver<MemoryTransport> {
        RobotiqHandDriver::new(side, MemoryTransport::new())
    }

    fn decoded(d: &RobotiqHandDriver<MemoryTransport>) -> Vec<RobotiqCommand> {
        d.transport()
            .take()
            .iter()
            .map(|m| m.decode().unwrap())
            .collect()
    }

    fn without_utime(cmd: RobotiqCommand) -> RobotiqCommand {
        RobotiqCommand { utime: 0, ..cmd }
    }

    #[test]
    fn test_channel_per_side() {
        let left = driver(Side::Left);
        let right = driver(Side::Right);
        left.send_drop().unwrap();
        right.send_drop().unwrap();
        assert_eq!(left.transport().published()[0].channel, "ROBOTIQ_LEFT_COMMAND");
        assert_eq!(right.transport().published()[0].channel, "ROBOTIQ_RIGHT_COMMAND");
    }

    #[test]
    fn test_close_fixed_force_and_velocity() {
        let d = driver(Side::Left);
        for p in [0.0, 25.0, 50.0, 99.0, 100.0] {
            d.send_close(p).unwrap();
            let cmd = decoded(&d).pop().unwrap();
            assert_eq!(cmd.force, 255);
            assert_eq!(cmd.velocity, 254);
            assert_eq!(cmd.do_move, 1);
            assert_eq!(cmd.activate, 1);
            assert_eq!(cmd.emergency_drop, 0);
            assert_eq!(cmd.position, (254.0 * p / 100.0_f64).round() as u8);
        }
    }

    #[test]
    fn test_open_is_inverted_close() {
        let d = driver(Side::Right);
        for p in [0.0, 10.0, 33.0, 80.0, 100.0] {
            d.send_open(p).unwrap();
            d.send_close(100.0 - p).unwrap();
            let msgs = decoded(&d);
            assert_eq!(without_utime(msgs[0].clone()), without_utime(msgs[1].clone()));
        }
    }

    #[test]
    fn test_custom_endpoints() {
        let d = driver(Side::Left);
        d.send_custom(0.0, 0.0, 0.0, 0).unwrap();
        d.send_custom(100.0, 100.0, 100.0, 4).unwrap();
        let msgs = decoded(&d);

        assert_eq!((msgs[0].position, msgs[0].force, msgs[0].velocity, msgs[0].mode), (0, 0, 0, 0));
        assert_eq!(
            (msgs[1].position, msgs[1].force, msgs[1].velocity, msgs[1].mode),
            (254, 255, 254, 4)
        );
        assert!(msgs.iter().all(|m| m.do_move == 1 && m.activate == 1));
    }

    #[test]
    fn test_custom_rejects_each_field() {
        let d = driver(Side::Left);
        let cases = [
            (101.0, 50.0, 50.0, 0, "position"),
            (50.0, -1.0, 50.0, 0, "force"),
            (50.0, 50.0, 200.0, 0, "velocity"),
            (50.0, 50.0, 50.0, 5, "mode"),
            (50.0, 50.0, 50.0, -1, "mode"),
        ];
        for (pos, force, vel, mode, expected) in cases {
            match d.send_custom(pos, force, vel, mode) {
                Err(HandError::OutOfRange { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected OutOfRange for {}, got {:?}", expected, other),
            }
        }
        assert!(d.send_close(-5.0).is_err());
        assert!(d.transport().is_empty());
    }

    #[test]
    fn test_calibrate_deactivate_then_activate() {
        let d = driver(Side::Left);
        d.send_calibrate().unwrap();

        let published = d.transport().published();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].channel, published[1].channel);
        assert!(published[1].at.duration_since(published[0].at) >= ACTIVATION_SETTLE_DELAY);

        let first: RobotiqCommand = published[0].decode().unwrap();
        let second: RobotiqCommand = published[1].decode().unwrap();
        assert_eq!(first.activate, 0);
        assert_eq!(second.activate, 1);
        assert_eq!(RobotiqCommand { activate: 0, ..second }, first);
    }

    #[test]
    fn test_drop_one_shot() {
        let d = driver(Side::Right);
        d.send_close(100.0).unwrap();
        d.transport().take();

        d.send_drop().unwrap();
        let msgs = decoded(&d);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].emergency_drop, 1);
        assert_eq!(msgs[0].do_move, 0);
    }

    #[test]
    fn test_set_mode() {
        let d = driver(Side::Left);
        for m in 0..=4 {
            d.set_mode(m).unwrap();
            let cmd = decoded(&d).pop().unwrap();
            assert_eq!(cmd.do_move, 0);
            assert_eq!((cmd.position, cmd.force, cmd.velocity), (0, 0, 0));
            assert_eq!(cmd.mode, m as u8);
        }
        assert!(d.set_mode(5).is_err());
        assert!(d.set_mode(-1).is_err());
        assert!(d.transport().is_empty());
    }

    #[test]
    fn test_regrasp_nudges_then_settles() {
        let d = driver(Side::Left);
        d.send_regrasp(50.0, 40.0, 30.0, 1).unwrap();

        let published = d.transport().published();
        assert_eq!(published.len(), 2);
        assert!(published[1].at.duration_since(published[0].at) >= REGRASP_SETTLE_DELAY);

        let nudge: RobotiqCommand = published[0].decode().unwrap();
        let settle: RobotiqCommand = published[1].decode().unwrap();
        // 254 * 0.48 = 121.92, 254 * 0.5 = 127
        assert_eq!(nudge.position, 122);
        assert_eq!(settle.position, 127);
        assert_eq!(nudge.force, settle.force);
        assert_eq!(nudge.mode, 1);
        assert_eq!(settle.mode, 1);
    }

    #[test]
    fn test_regrasp_small_position_repeats() {
        let d = driver(Side::Left);
        d.send_regrasp(1.0, 10.0, 10.0, 0).unwrap();
        let msgs = decoded(&d);
        assert_eq!(without_utime(msgs[0].clone()), without_utime(msgs[1].clone()));
    }

    #[test]
    fn test_regrasp_invalid_nudge_publishes_nothing() {
        let d = driver(Side::Left);
        // 1.5 nudges to -0.5
        assert!(d.send_regrasp(1.5, 10.0, 10.0, 0).is_err());
        assert!(d.send_regrasp(50.0, 10.0, 10.0, 9).is_err());
        assert!(d.transport().is_empty());
    }

    #[test]
    fn test_calibrate_not_interleaved() {
        let d = Arc::new(driver(Side::Left));
        let calibrating = {
            let d = Arc::clone(&d);
            thread::spawn(move || d.send_calibrate().unwrap())
        };
        let switching = {
            let d = Arc::clone(&d);
            thread::spawn(move || {
                for m in 0..5 {
                    d.set_mode(m).unwrap();
                }
            })
        };
        calibrating.join().unwrap();
        switching.join().unwrap();

        let msgs = decoded(&d);
        assert_eq!(msgs.len(), 7);
        let deactivate = msgs.iter().position(|m| m.activate == 0).unwrap();
        assert_eq!(msgs[deactivate + 1].activate, 1);
        assert_eq!(msgs[deactivate + 1].utime, msgs[deactivate].utime);
    }

    #[test]
    fn test_sides_run_independently() {
        let bus = Arc::new(MemoryTransport::new());
        let left = RobotiqHandDriver::new(Side::Left, Arc::clone(&bus));
        let right = RobotiqHandDriver::new(Side::Right, Arc::clone(&bus));
        thread::scope(|s| {
            s.spawn(|| left.send_calibrate().unwrap());
            s.spawn(|| right.send_calibrate().unwrap());
        });
        let published = bus.published();
        assert_eq!(published.len(), 4);
        assert_eq!(
            published.iter().filter(|m| m.channel == "ROBOTIQ_LEFT_COMMAND").count(),
            2
        );
    }
}
