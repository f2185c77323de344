/// Errors that can occur in transport client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error (connection establishment, socket setup).
    #[error("transport error: {0}")]
    Transport(#[from] pigpio_transport::TransportError),

    /// Protocol-level error (malformed or oversized frames).
    #[error("protocol error: {0}")]
    Protocol(#[from] pigpio_protocol::ProtocolError),

    /// An I/O error occurred mid-exchange.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The daemon closed the connection before a complete exchange.
    #[error("connection closed (incomplete exchange)")]
    ConnectionClosed,

    /// The daemon announced an extension reply larger than permitted.
    #[error("extension reply too large ({size} bytes, max {max})")]
    ExtensionReplyTooLarge { size: usize, max: usize },

    /// A shared client's mutex was poisoned by a panicked holder.
    #[error("client mutex poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, ClientError>;
