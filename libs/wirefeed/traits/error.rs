use thiserror::Error;

/// Main error type for wirefeed
#[derive(Error, Debug)]
pub enum WirefeedError {
    /// Transport-level WebSocket error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Connection closed by the remote end
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Malformed inbound payload
    #[error("Parse error: {0}")]
    Parse(String),

    /// Channel send error
    #[error("Channel send error: {0}")]
    ChannelSend(String),

    /// Channel receive error
    #[error("Channel receive error: {0}")]
    ChannelReceive(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid state transition
    #[error("Invalid state transition: {0}")]
    InvalidState(String),
}

/// Result type for wirefeed operations
pub type Result<T> = std::result::Result<T, WirefeedError>;
