// Keyboard teleop: O/C open/close 10%, K calibrate, D drop, 0-4 mode, Q quit
//
// Usage: cargo run --example hand_teleop -- [irobot|robotiq] [left|right]
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use hand_zenoh_driver::{HandDriver, IRobotHandDriver, RobotiqHandDriver, Side, ZenohTransport};
use std::time::Duration;
use tracing::{info, warn};

const STEP_PERCENT: f64 = 10.0;

enum Hand {
    IRobot(IRobotHandDriver<ZenohTransport>),
    Robotiq(RobotiqHandDriver<ZenohTransport>),
}

impl Hand {
    fn gestures(&self) -> &dyn HandDriver {
        match self {
            Hand::IRobot(d) => d,
            Hand::Robotiq(d) => d,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let mut args = std::env::args().skip(1);
    let kind = args.next().unwrap_or_else(|| "robotiq".to_string());
    let side: Side = args.next().as_deref().unwrap_or("left").parse()?;

    info!("Opening Zenoh session...");
    let transport = ZenohTransport::open(zenoh::Config::default())?;
    let hand = match kind.as_str() {
        "irobot" => Hand::IRobot(IRobotHandDriver::new(side, transport)),
        "robotiq" => Hand::Robotiq(RobotiqHandDriver::new(side, transport)),
        other => return Err(format!("unknown hand '{}'", other).into()),
    };

    info!("Controls: O/C=open/close, K=calibrate, D=drop, 0-4=mode, Q=quit");

    enable_raw_mode()?;
    let result = run_teleop(&hand);
    disable_raw_mode()?;

    result
}

fn run_teleop(hand: &Hand) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Start from fully open
    let mut closed = 0.0_f64;

    loop {
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(KeyEvent { code, kind, .. }) = event::read()? else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }

        let sent = match code {
            KeyCode::Char('c') => {
                closed = (closed + STEP_PERCENT).min(100.0);
                hand.gestures().send_close(closed)
            }
            KeyCode::Char('o') => {
                closed = (closed - STEP_PERCENT).max(0.0);
                hand.gestures().send_open(100.0 - closed)
            }
            KeyCode::Char('k') => hand.gestures().send_calibrate(),
            KeyCode::Char('d') => match hand {
                Hand::Robotiq(d) => d.send_drop(),
                Hand::IRobot(_) => {
                    warn!("Drop is Robotiq only");
                    Ok(())
                }
            },
            KeyCode::Char(c @ '0'..='4') => match hand {
                Hand::Robotiq(d) => d.set_mode(c as i32 - '0' as i32),
                Hand::IRobot(_) => {
                    warn!("Grasp modes are Robotiq only");
                    Ok(())
                }
            },
            KeyCode::Char('q') | KeyCode::Esc => break,
            _ => Ok(()),
        };

        // Keep the session alive on a rejected command
        if let Err(e) = sent {
            warn!("Command failed: {}", e);
        } else {
            info!("Closed: {:.0}%", closed);
        }
    }

    Ok(())
}
