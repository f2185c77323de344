use pigpio_client::ClientError;

/// Errors surfaced by SPI devices.
///
/// Daemon-reported failures keep the originating numeric code so callers
/// can branch on exact codes instead of matching message strings.
#[derive(Debug, thiserror::Error)]
pub enum SpiError {
    /// Failure reported by the transport client, propagated unchanged.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// The daemon rejected an open command.
    #[error("Opening device failed => {message}")]
    OpenFailed { code: i32, message: &'static str },

    /// The daemon rejected a close command.
    #[error("Closing device failed => {message}")]
    CloseFailed { code: i32, message: &'static str },

    /// The daemon rejected a data transfer.
    #[error("Transferring data failed => {message}")]
    TransferFailed { code: i32, message: &'static str },

    /// The operation needs an open device.
    #[error("device is not open")]
    NotOpen,
}

impl SpiError {
    /// The daemon error code carried by this error, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            SpiError::OpenFailed { code, .. }
            | SpiError::CloseFailed { code, .. }
            | SpiError::TransferFailed { code, .. } => Some(*code),
            SpiError::Client(_) | SpiError::NotOpen => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SpiError>;
