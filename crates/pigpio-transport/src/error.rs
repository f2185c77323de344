use std::net::SocketAddr;

/// Errors that can occur while talking to the daemon socket.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to resolve the daemon address.
    #[error("failed to resolve daemon address: {0}")]
    Resolve(std::io::Error),

    /// The daemon address resolved to no usable candidates.
    #[error("daemon address resolved to no candidates")]
    NoAddress,

    /// Failed to connect to the daemon.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// An I/O error occurred on the daemon socket.
    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
