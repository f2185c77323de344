/// Errors that can occur during request encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The extension payload exceeds what the 32-bit length field carries.
    #[error("extension too large ({size} bytes, max {max})")]
    ExtensionTooLarge { size: usize, max: usize },

    /// The buffer holds a command number the registry does not know.
    #[error("unknown command opcode {0}")]
    UnknownOpcode(u32),

    /// An extension was present on a command that takes none.
    #[error("command {command} takes no extension ({len} bytes given)")]
    UnexpectedExtension { command: &'static str, len: usize },

    /// The extension length does not fit the command's field layout.
    #[error("bad extension length {len} for command {command}")]
    BadExtensionLength { command: &'static str, len: usize },
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
