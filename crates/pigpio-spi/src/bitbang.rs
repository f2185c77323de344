use pigpio_client::SendRaw;
use pigpio_protocol::{Command, Extension, Request};
use tracing::debug;

use crate::device::SpiDevice;
use crate::error::{Result, SpiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceState {
    Closed,
    Open,
}

/// A software-emulated SPI interface on caller-chosen GPIO pins.
///
/// Configuration is fixed at construction; only the open/closed state
/// changes over the device's lifetime. The daemon owns the physical pins
/// and is informed of every transition — the device merely tracks the
/// logical handle.
///
/// The daemon error codes recognized here are specific to the
/// bit-banging commands; the hardware variant keeps its own table.
pub struct BitBangSpiDevice<C> {
    client: C,
    baud: u32,
    channel: u32,
    cs_pin: u32,
    sclk_pin: u32,
    miso_pin: u32,
    mosi_pin: u32,
    state: DeviceState,
}

impl<C: SendRaw> BitBangSpiDevice<C> {
    /// Daemon code: an invalid GPIO pin was supplied.
    pub const PI_BAD_USER_GPIO: i32 = -2;
    /// Daemon code: a pin is already claimed by another resource.
    pub const PI_GPIO_IN_USE: i32 = -50;
    /// Daemon code: bad byte count for a transfer.
    pub const PI_BAD_SPI_COUNT: i32 = -84;
    /// Daemon code: bad data pointer for a transfer.
    pub const PI_BAD_POINTER: i32 = -90;
    /// Daemon code: baud rate outside the supported range.
    pub const PI_BAD_SPI_BAUD: i32 = -141;
    /// Daemon code: no bit-banging SPI interface on the pin.
    pub const PI_NOT_SPI_GPIO: i32 = -142;

    /// Create a closed device.
    ///
    /// Pin roles are daemon-defined and passed through unmodified;
    /// nothing is validated locally — the daemon is the authority on pin
    /// numbering and baud range.
    pub fn new(
        client: C,
        baud: u32,
        channel: u32,
        cs_pin: u32,
        sclk_pin: u32,
        miso_pin: u32,
        mosi_pin: u32,
    ) -> Self {
        Self {
            client,
            baud,
            channel,
            cs_pin,
            sclk_pin,
            miso_pin,
            mosi_pin,
            state: DeviceState::Closed,
        }
    }

    /// Open the interface. Idempotent: an already-open device sends
    /// nothing.
    pub fn open(&mut self) -> Result<()> {
        if self.state == DeviceState::Open {
            return Ok(());
        }

        let request = Request::with_extension(
            Command::BbSpiOpen,
            self.channel,
            0,
            Extension::words([
                self.cs_pin,
                self.sclk_pin,
                self.miso_pin,
                self.baud,
                self.mosi_pin,
            ]),
        );
        let response = self.client.send_raw(&request)?;
        if response.is_err() {
            return Err(Self::open_error(response.result));
        }

        self.state = DeviceState::Open;
        debug!(channel = self.channel, "bit-banging SPI interface open");
        Ok(())
    }

    /// Close the interface. Idempotent: an already-closed device sends
    /// nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.state == DeviceState::Closed {
            return Ok(());
        }

        let request = Request::new(Command::BbSpiClose, self.channel, 0);
        let response = self.client.send_raw(&request)?;
        if response.is_err() {
            return Err(Self::close_error(response.result));
        }

        self.state = DeviceState::Closed;
        debug!(channel = self.channel, "bit-banging SPI interface closed");
        Ok(())
    }

    /// Whether the interface is open. Pure state query, no I/O.
    pub fn is_open(&self) -> bool {
        self.state == DeviceState::Open
    }

    /// Full-duplex transfer: clock `tx` out and return the bytes read
    /// back (always as many as were sent).
    pub fn transfer(&mut self, tx: &[u8]) -> Result<Vec<u8>> {
        if self.state != DeviceState::Open {
            return Err(SpiError::NotOpen);
        }

        let request = Request::with_extension(
            Command::BbSpiTransfer,
            self.channel,
            0,
            Extension::data(tx),
        );
        let (result, data) = self.client.send_raw_ext(&request)?;
        if result < 0 {
            return Err(Self::transfer_error(result));
        }
        Ok(data.to_vec())
    }

    /// The channel identifier this device was constructed with.
    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// The baud rate this device was constructed with.
    pub fn baud(&self) -> u32 {
        self.baud
    }

    /// Consume the device and return the transport client.
    ///
    /// The daemon is not told anything; callers wanting the interface
    /// released should [`close`](Self::close) first.
    pub fn into_client(self) -> C {
        self.client
    }

    fn open_error(code: i32) -> SpiError {
        let message = match code {
            Self::PI_BAD_USER_GPIO => "bad GPIO pin given (PI_BAD_USER_GPIO)",
            Self::PI_GPIO_IN_USE => "GPIO pin is already in use (PI_GPIO_IN_USE)",
            Self::PI_BAD_SPI_BAUD => "bad baud rate given (PI_BAD_SPI_BAUD)",
            _ => "unknown error",
        };
        SpiError::OpenFailed { code, message }
    }

    fn close_error(code: i32) -> SpiError {
        let message = match code {
            Self::PI_BAD_USER_GPIO => "bad GPIO pin given (PI_BAD_USER_GPIO)",
            Self::PI_NOT_SPI_GPIO => {
                "no bit-banging SPI in progress on the GPIO (PI_NOT_SPI_GPIO)"
            }
            _ => "unknown error",
        };
        SpiError::CloseFailed { code, message }
    }

    fn transfer_error(code: i32) -> SpiError {
        let message = match code {
            Self::PI_BAD_USER_GPIO => "bad GPIO pin given (PI_BAD_USER_GPIO)",
            Self::PI_NOT_SPI_GPIO => {
                "no bit-banging SPI in progress on the GPIO (PI_NOT_SPI_GPIO)"
            }
            Self::PI_BAD_POINTER => "bad data pointer given (PI_BAD_POINTER)",
            Self::PI_BAD_SPI_COUNT => "bad byte count given (PI_BAD_SPI_COUNT)",
            _ => "unknown error",
        };
        SpiError::TransferFailed { code, message }
    }
}

impl<C: SendRaw> SpiDevice for BitBangSpiDevice<C> {
    fn open(&mut self) -> Result<()> {
        BitBangSpiDevice::open(self)
    }

    fn close(&mut self) -> Result<()> {
        BitBangSpiDevice::close(self)
    }

    fn is_open(&self) -> bool {
        BitBangSpiDevice::is_open(self)
    }

    fn transfer(&mut self, tx: &[u8]) -> Result<Vec<u8>> {
        BitBangSpiDevice::transfer(self, tx)
    }
}
