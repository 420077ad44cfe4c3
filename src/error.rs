// Error types for hand drivers and the bus

/// Errors raised by hand drivers, transports and the monitor
#[derive(Debug, thiserror::Error)]
pub enum HandError {
    #[error("Invalid hand side '{0}', expected 'left' or 'right'")]
    InvalidSide(String),

    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to decode message on {channel}: {source}")]
    Decode {
        channel: String,
        source: serde_json::Error,
    },

    #[error("Transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, HandError>;
