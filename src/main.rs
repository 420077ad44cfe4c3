// hand-cmd: send gesture commands to a robot hand over Zenoh
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hand_zenoh_driver::{
    HandDriver, IRobotHandDriver, MemoryTransport, RobotiqHandDriver, Side, Transport,
    ZenohTransport, messages::MessageKind, monitor,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HandKind {
    Irobot,
    Robotiq,
}

#[derive(Debug, Parser)]
#[command(name = "hand-cmd", about = "Send gesture commands to a robot hand")]
struct Cli {
    /// Hand protocol
    #[arg(long, value_enum, default_value_t = HandKind::Robotiq)]
    hand: HandKind,

    /// Which hand: left or right
    #[arg(long, default_value = "left")]
    side: Side,

    /// Zenoh JSON5 config file (defaults to a peer session)
    #[arg(long)]
    zenoh_config: Option<PathBuf>,

    /// Print the messages instead of publishing them
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Calibrate (iRobot: in jig unless --no-jig; Robotiq: deactivate/activate)
    Calibrate {
        #[arg(long)]
        no_jig: bool,
    },
    /// Open by a percentage
    Open {
        #[arg(default_value_t = 100.0)]
        percentage: f64,
    },
    /// Close by a percentage
    Close {
        #[arg(default_value_t = 100.0)]
        percentage: f64,
    },
    /// Emergency release (Robotiq)
    Drop,
    /// Move with position/force/velocity percentages and a grasp mode (Robotiq)
    Custom {
        position: f64,
        force: f64,
        velocity: f64,
        mode: i32,
    },
    /// Nudge open slightly then settle at the position (Robotiq)
    Regrasp {
        position: f64,
        force: f64,
        velocity: f64,
        mode: i32,
    },
    /// Switch grasp mode without moving (Robotiq)
    Mode { mode: i32 },
    /// Log every message seen on this hand's channels until Ctrl-C
    Monitor,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=debug to see every publish)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("hand-cmd error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), BoxError> {
    let Cli {
        hand,
        side,
        zenoh_config,
        dry_run,
        command,
    } = cli;

    if dry_run {
        if matches!(command, Command::Monitor) {
            return Err("monitor needs a live session, drop --dry-run".into());
        }
        let bus = Arc::new(MemoryTransport::new());
        let transport = Arc::clone(&bus);
        tokio::task::spawn_blocking(move || dispatch(hand, side, command, transport)).await??;
        for msg in bus.published() {
            println!("{} {}", msg.channel, String::from_utf8_lossy(&msg.payload));
        }
        return Ok(());
    }

    info!("Opening Zenoh session...");
    let session = zenoh::open(load_zenoh_config(zenoh_config.as_deref())?).await?;

    if matches!(command, Command::Monitor) {
        let channels = driver_channels(hand, side, ZenohTransport::new(session.clone()));
        return monitor::run(session, channels).await;
    }

    let transport = ZenohTransport::new(session);
    tokio::task::spawn_blocking(move || dispatch(hand, side, command, transport)).await??;
    Ok(())
}

fn load_zenoh_config(path: Option<&Path>) -> Result<zenoh::Config, BoxError> {
    match path {
        Some(path) => {
            info!("Loading Zenoh config from {}", path.display());
            zenoh::Config::from_file(path)
        }
        None => Ok(zenoh::Config::default()),
    }
}

fn driver_channels<T: Transport>(hand: HandKind, side: Side, transport: T) -> Vec<(String, MessageKind)> {
    match hand {
        HandKind::Irobot => IRobotHandDriver::new(side, transport).channels(),
        HandKind::Robotiq => RobotiqHandDriver::new(side, transport).channels(),
    }
}

/// Run one command to completion; blocks through any settle delays
fn dispatch<T: Transport>(
    hand: HandKind,
    side: Side,
    command: Command,
    transport: T,
) -> Result<(), BoxError> {
    match hand {
        HandKind::Irobot => {
            let driver = IRobotHandDriver::new(side, transport);
            match command {
                Command::Calibrate { no_jig } => driver.send_calibrate_with_jig(!no_jig)?,
                Command::Open { percentage } => driver.send_open(percentage)?,
                Command::Close { percentage } => driver.send_close(percentage)?,
                other => return Err(format!("{:?} is not supported by the iRobot hand", other).into()),
            }
        }
        HandKind::Robotiq => {
            let driver = RobotiqHandDriver::new(side, transport);
            match command {
                Command::Calibrate { no_jig } => {
                    if no_jig {
                        warn!("--no-jig has no effect on the Robotiq hand");
                    }
                    driver.send_calibrate()?
                }
                Command::Open { percentage } => driver.send_open(percentage)?,
                Command::Close { percentage } => driver.send_close(percentage)?,
                Command::Drop => driver.send_drop()?,
                Command::Custom {
                    position,
                    force,
                    velocity,
                    mode,
                } => driver.send_custom(position, force, velocity, mode)?,
                Command::Regrasp {
                    position,
                    force,
                    velocity,
                    mode,
                } => driver.send_regrasp(position, force, velocity, mode)?,
                Command::Mode { mode } => driver.set_mode(mode)?,
                Command::Monitor => return Err("monitor is not a hand command".into()),
            }
        }
    }
    Ok(())
}
