// Publish seam between the hand drivers and the bus
//
// Publishing is synchronous and fire-and-forget: no ack, no retry. Whatever
// the bus returns on failure goes straight back to the caller.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;
use zenoh::Wait;

use crate::error::{HandError, Result};

pub trait Transport {
    fn publish(&self, channel: &str, payload: &[u8]) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn publish(&self, channel: &str, payload: &[u8]) -> Result<()> {
        (**self).publish(channel, payload)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn publish(&self, channel: &str, payload: &[u8]) -> Result<()> {
        (**self).publish(channel, payload)
    }
}

/// Encode a message as JSON and publish it
pub fn publish_message<T, M>(transport: &T, channel: &str, msg: &M) -> Result<()>
where
    T: Transport + ?Sized,
    M: Serialize,
{
    let payload = serde_json::to_vec(msg)?;
    transport.publish(channel, &payload)
}

/// Publishes through a Zenoh session using the blocking API
pub struct ZenohTransport {
    session: zenoh::Session,
}

impl ZenohTransport {
    pub fn new(session: zenoh::Session) -> Self {
        Self { session }
    }

    /// Open a session from the given config, blocking until it is up
    pub fn open(config: zenoh::Config) -> Result<Self> {
        let session = zenoh::open(config).wait().map_err(HandError::Transport)?;
        Ok(Self { session })
    }

    pub fn session(&self) -> &zenoh::Session {
        &self.session
    }
}

impl Transport for ZenohTransport {
    fn publish(&self, channel: &str, payload: &[u8]) -> Result<()> {
        debug!("Publishing {} bytes to {}", payload.len(), channel);
        self.session
            .put(channel, payload.to_vec())
            .wait()
            .map_err(HandError::Transport)
    }
}

/// A message captured by [`MemoryTransport`]
#[derive(Debug, Clone)]
pub struct Published {
    pub channel: String,
    pub payload: Vec<u8>,
    pub at: Instant,
}

impl Published {
    pub fn decode<M: serde::de::DeserializeOwned>(&self) -> Result<M> {
        serde_json::from_slice(&self.payload).map_err(|source| HandError::Decode {
            channel: self.channel.clone(),
            source,
        })
    }
}

/// Keeps every publish in memory instead of sending it (dry runs, tests)
#[derive(Default)]
pub struct MemoryTransport {
    published: Mutex<Vec<Published>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far, in order
    pub fn published(&self) -> Vec<Published> {
        self.published.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.published.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.published.lock().is_empty()
    }

    /// Remove and return everything published so far
    pub fn take(&self) -> Vec<Published> {
        std::mem::take(&mut *self.published.lock())
    }
}

impl Transport for MemoryTransport {
    fn publish(&self, channel: &str, payload: &[u8]) -> Result<()> {
        debug!("Recording {} bytes for {}", payload.len(), channel);
        self.published.lock().push(Published {
            channel: channel.to_string(),
            payload: payload.to_vec(),
            at: Instant::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::CalibrateMessage;

    struct DownTransport;

    impl Transport for DownTransport {
        fn publish(&self, _channel: &str, _payload: &[u8]) -> Result<()> {
            Err(HandError::Transport("bus unavailable".into()))
        }
    }

    #[test]
    fn test_memory_transport_records_in_order() {
        let bus = MemoryTransport::new();
        bus.publish("A", b"1").unwrap();
        bus.publish("B", b"2").unwrap();

        let msgs = bus.published();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].channel, "A");
        assert_eq!(msgs[1].payload, b"2");
        assert!(msgs[0].at <= msgs[1].at);
    }

    #[test]
    fn test_publish_message_encodes_json() {
        let bus = Arc::new(MemoryTransport::new());
        let msg = CalibrateMessage {
            utime: 42,
            in_jig: false,
        };
        publish_message(&bus, "IROBOT_LEFT_CALIBRATE", &msg).unwrap();

        let decoded: CalibrateMessage = bus.published()[0].decode().unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_transport_error_propagates() {
        let msg = CalibrateMessage {
            utime: 1,
            in_jig: true,
        };
        let err = publish_message(&DownTransport, "X", &msg).unwrap_err();
        assert!(matches!(err, HandError::Transport(_)));
        assert!(err.to_string().contains("bus unavailable"));
    }

    #[test]
    fn test_take_drains() {
        let bus = MemoryTransport::new();
        bus.publish("A", b"1").unwrap();
        assert_eq!(bus.take().len(), 1);
        assert!(bus.is_empty());
    }
}
