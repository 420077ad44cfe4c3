// Bus listener: logs every hand message seen on the driver channels
// Runs until Ctrl-C. Malformed payloads are logged and skipped.

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::messages::{HandMessage, MessageKind};

/// One-line human summary of a message
pub fn summarize(msg: &HandMessage) -> String {
    match msg {
        HandMessage::Calibrate(m) => format!("calibrate in_jig={}", m.in_jig),
        HandMessage::PositionClose(m) => format!(
            "close {:.1}% valid={:?}",
            m.close_fraction * 100.0,
            m.valid
        ),
        HandMessage::RobotiqCommand(m) if m.emergency_drop == 1 => "emergency drop".to_string(),
        HandMessage::RobotiqCommand(m) if m.do_move == 1 => format!(
            "move position={} force={} velocity={} mode={}",
            m.position, m.force, m.velocity, m.mode
        ),
        HandMessage::RobotiqCommand(m) => format!("activate={} mode={}", m.activate, m.mode),
    }
}

/// Decode and log one sample; returns the message if it parsed
pub fn on_sample(kind: MessageKind, channel: &str, payload: &[u8]) -> Option<HandMessage> {
    match HandMessage::decode(kind, channel, payload) {
        Ok(msg) => {
            info!("[{}] utime={} {}", channel, msg.utime(), summarize(&msg));
            Some(msg)
        }
        Err(e) => {
            warn!("Skipping message: {}", e);
            None
        }
    }
}

pub async fn run(
    session: zenoh::Session,
    channels: Vec<(String, MessageKind)>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut tasks = JoinSet::new();

    for (channel, kind) in channels {
        let subscriber = session.declare_subscriber(channel.clone()).await?;
        info!("Subscribed to: {}", channel);

        tasks.spawn(async move {
            while let Ok(sample) = subscriber.recv_async().await {
                let payload = sample.payload().to_bytes();
                on_sample(kind, &channel, &payload);
            }
        });
    }

    tokio::signal::ctrl_c().await?;
    info!("Stopping monitor");
    tasks.abort_all();
    Ok(())
}
