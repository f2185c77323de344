//! The command registry: symbolic names for the daemon's numeric opcodes.
//!
//! The discriminants are the daemon's own command numbers. The table is a
//! versioned contract with the daemon and must never be renumbered
//! locally.

/// Commands understood by the daemon's SPI subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Command {
    /// Open a hardware SPI channel; the result is a daemon handle.
    SpiOpen = 71,
    /// Close a hardware SPI handle.
    SpiClose = 72,
    /// Read bytes from a hardware SPI handle.
    SpiRead = 73,
    /// Write bytes to a hardware SPI handle.
    SpiWrite = 74,
    /// Full-duplex transfer on a hardware SPI handle.
    SpiTransfer = 75,
    /// Close a bit-banging SPI interface.
    BbSpiClose = 111,
    /// Open a bit-banging SPI interface.
    BbSpiOpen = 112,
    /// Full-duplex transfer on a bit-banging SPI interface.
    BbSpiTransfer = 113,
}

/// How a command lays out its request extension, when it carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionLayout {
    /// No extension permitted.
    None,
    /// A sequence of 4-byte little-endian words.
    Words,
    /// A raw run of data bytes.
    Bytes,
}

impl Command {
    /// The daemon-assigned command number.
    pub const fn opcode(self) -> u32 {
        self as u32
    }

    /// The daemon's mnemonic for this command, for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Command::SpiOpen => "SPIO",
            Command::SpiClose => "SPIC",
            Command::SpiRead => "SPIR",
            Command::SpiWrite => "SPIW",
            Command::SpiTransfer => "SPIX",
            Command::BbSpiClose => "BSPIC",
            Command::BbSpiOpen => "BSPIO",
            Command::BbSpiTransfer => "BSPIX",
        }
    }

    /// The extension layout this command's requests use.
    pub const fn extension_layout(self) -> ExtensionLayout {
        match self {
            Command::SpiOpen | Command::BbSpiOpen => ExtensionLayout::Words,
            Command::SpiWrite | Command::SpiTransfer | Command::BbSpiTransfer => {
                ExtensionLayout::Bytes
            }
            Command::SpiClose | Command::SpiRead | Command::BbSpiClose => ExtensionLayout::None,
        }
    }

    /// Look up a command by its daemon-assigned number.
    pub const fn from_opcode(opcode: u32) -> Option<Self> {
        match opcode {
            71 => Some(Command::SpiOpen),
            72 => Some(Command::SpiClose),
            73 => Some(Command::SpiRead),
            74 => Some(Command::SpiWrite),
            75 => Some(Command::SpiTransfer),
            111 => Some(Command::BbSpiClose),
            112 => Some(Command::BbSpiOpen),
            113 => Some(Command::BbSpiTransfer),
            _ => None,
        }
    }
}
