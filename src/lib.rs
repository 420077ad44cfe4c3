pub mod config;
pub mod error;
pub mod hand;
pub mod messages;
pub mod monitor;
pub mod transport;
pub mod utime;

pub use error::{HandError, Result};
pub use hand::{HandDriver, IRobotHandDriver, RobotiqHandDriver, Side};
pub use transport::{MemoryTransport, Transport, ZenohTransport};
