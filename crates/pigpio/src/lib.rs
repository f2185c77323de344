//! Client for the pigpio daemon's binary socket protocol.
//!
//! The daemon owns and arbitrates physical GPIO hardware; this workspace
//! talks to it over its numbered-command socket protocol.
//!
//! # Crate Structure
//!
//! - [`transport`] — socket connection to the daemon
//! - [`protocol`] — request/response frame codec and command registry
//! - [`client`] — the transport client (one request, one reply, in order)
//! - [`spi`] — SPI devices built on the command set (behind `spi` feature)

/// Re-export transport types.
pub mod transport {
    pub use pigpio_transport::*;
}

/// Re-export protocol types.
pub mod protocol {
    pub use pigpio_protocol::*;
}

/// Re-export client types.
pub mod client {
    pub use pigpio_client::*;
}

/// Re-export SPI device types (requires `spi` feature).
#[cfg(feature = "spi")]
pub mod spi {
    pub use pigpio_spi::*;
}
