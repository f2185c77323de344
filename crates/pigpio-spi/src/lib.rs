//! SPI over the daemon socket protocol.
//!
//! Two device flavours share one lifecycle: [`BitBangSpiDevice`] drives a
//! software-emulated interface on caller-chosen GPIO pins, while
//! [`HardwareSpiDevice`] drives a dedicated controller channel through a
//! daemon-issued handle. Both implement [`SpiDevice`].
//!
//! Devices never retry: every daemon-reported failure surfaces
//! immediately as a typed error carrying the originating numeric code.

pub mod bitbang;
pub mod device;
pub mod error;
pub mod hardware;

pub use bitbang::BitBangSpiDevice;
pub use device::SpiDevice;
pub use error::{Result, SpiError};
pub use hardware::HardwareSpiDevice;
