use pigpio_client::SendRaw;
use pigpio_protocol::{Command, Extension, Request};
use tracing::debug;

use crate::device::SpiDevice;
use crate::error::{Result, SpiError};

/// A dedicated hardware SPI controller channel.
///
/// Fixed controller pins are implied by the channel; the caller supplies
/// no pin list. A successful open yields a daemon handle, which the
/// device presents on every subsequent command — the handle doubles as
/// the open/closed state.
///
/// The daemon error codes recognized here belong to the hardware SPI
/// commands and are deliberately not shared with the bit-banging
/// variant: the daemon defines different valid code sets per command.
pub struct HardwareSpiDevice<C> {
    client: C,
    channel: u32,
    baud: u32,
    flags: u32,
    handle: Option<u32>,
}

impl<C: SendRaw> HardwareSpiDevice<C> {
    /// Daemon code: the handle is unknown to the daemon.
    pub const PI_BAD_HANDLE: i32 = -25;
    /// Daemon code: opening the SPI device failed.
    pub const PI_SPI_OPEN_FAILED: i32 = -73;
    /// Daemon code: invalid SPI channel.
    pub const PI_BAD_SPI_CHANNEL: i32 = -76;
    /// Daemon code: invalid flags word.
    pub const PI_BAD_FLAGS: i32 = -77;
    /// Daemon code: baud rate outside the supported range.
    pub const PI_BAD_SPI_SPEED: i32 = -78;
    /// Daemon code: bad byte count for a transfer.
    pub const PI_BAD_SPI_COUNT: i32 = -84;
    /// Daemon code: the transfer itself failed.
    pub const PI_SPI_XFER_FAILED: i32 = -89;
    /// Daemon code: the auxiliary SPI controller is not available.
    pub const PI_NO_AUX_SPI: i32 = -91;

    /// Create a closed device with a zero flags word.
    pub fn new(client: C, channel: u32, baud: u32) -> Self {
        Self::with_flags(client, channel, baud, 0)
    }

    /// Create a closed device with an explicit daemon flags word.
    pub fn with_flags(client: C, channel: u32, baud: u32, flags: u32) -> Self {
        Self {
            client,
            channel,
            baud,
            flags,
            handle: None,
        }
    }

    /// Open the channel. Idempotent: an already-open device sends
    /// nothing. Success stores the daemon handle.
    pub fn open(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }

        let request = Request::with_extension(
            Command::SpiOpen,
            self.channel,
            0,
            Extension::words([self.baud, self.flags]),
        );
        let response = self.client.send_raw(&request)?;
        if response.is_err() {
            return Err(Self::open_error(response.result));
        }

        self.handle = Some(response.result as u32);
        debug!(
            channel = self.channel,
            handle = response.result,
            "hardware SPI channel open"
        );
        Ok(())
    }

    /// Close the channel. Idempotent: an already-closed device sends
    /// nothing. Success releases the daemon handle.
    pub fn close(&mut self) -> Result<()> {
        let Some(handle) = self.handle else {
            return Ok(());
        };

        let request = Request::new(Command::SpiClose, handle, 0);
        let response = self.client.send_raw(&request)?;
        if response.is_err() {
            return Err(Self::close_error(response.result));
        }

        self.handle = None;
        debug!(channel = self.channel, "hardware SPI channel closed");
        Ok(())
    }

    /// Whether the channel is open. Pure state query, no I/O.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Full-duplex transfer: clock `tx` out and return the bytes read
    /// back (always as many as were sent).
    pub fn transfer(&mut self, tx: &[u8]) -> Result<Vec<u8>> {
        let handle = self.handle.ok_or(SpiError::NotOpen)?;

        let request =
            Request::with_extension(Command::SpiTransfer, handle, 0, Extension::data(tx));
        let (result, data) = self.client.send_raw_ext(&request)?;
        if result < 0 {
            return Err(Self::transfer_error(result));
        }
        Ok(data.to_vec())
    }

    /// Read `count` bytes from the channel (MOSI held idle).
    pub fn read(&mut self, count: u32) -> Result<Vec<u8>> {
        let handle = self.handle.ok_or(SpiError::NotOpen)?;

        let request = Request::new(Command::SpiRead, handle, count);
        let (result, data) = self.client.send_raw_ext(&request)?;
        if result < 0 {
            return Err(Self::transfer_error(result));
        }
        Ok(data.to_vec())
    }

    /// Write bytes to the channel, discarding whatever is read back.
    pub fn write(&mut self, tx: &[u8]) -> Result<()> {
        let handle = self.handle.ok_or(SpiError::NotOpen)?;

        let request = Request::with_extension(Command::SpiWrite, handle, 0, Extension::data(tx));
        let response = self.client.send_raw(&request)?;
        if response.is_err() {
            return Err(Self::transfer_error(response.result));
        }
        Ok(())
    }

    /// The daemon handle, while open.
    pub fn handle(&self) -> Option<u32> {
        self.handle
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
    /// The daemon is not told anything; callers wanting the handle
    /// released should [`close`](Self::close) first.
    pub fn into_client(self) -> C {
        self.client
    }

    fn open_error(code: i32) -> SpiError {
        let message = match code {
            Self::PI_SPI_OPEN_FAILED => "opening SPI device failed (PI_SPI_OPEN_FAILED)",
            Self::PI_BAD_SPI_CHANNEL => "bad SPI channel given (PI_BAD_SPI_CHANNEL)",
            Self::PI_BAD_FLAGS => "bad flags given (PI_BAD_FLAGS)",
            Self::PI_BAD_SPI_SPEED => "bad baud rate given (PI_BAD_SPI_SPEED)",
            Self::PI_NO_AUX_SPI => "auxiliary SPI not available (PI_NO_AUX_SPI)",
            _ => "unknown error",
        };
        SpiError::OpenFailed { code, message }
    }

    fn close_error(code: i32) -> SpiError {
        let message = match code {
            Self::PI_BAD_HANDLE => "bad handle given (PI_BAD_HANDLE)",
            _ => "unknown error",
        };
        SpiError::CloseFailed { code, message }
    }

    fn transfer_error(code: i32) -> SpiError {
        let message = match code {
            Self::PI_BAD_HANDLE => "bad handle given (PI_BAD_HANDLE)",
            Self::PI_BAD_SPI_COUNT => "bad byte count given (PI_BAD_SPI_COUNT)",
            Self::PI_SPI_XFER_FAILED => "SPI transfer failed (PI_SPI_XFER_FAILED)",
            _ => "unknown error",
        };
        SpiError::TransferFailed { code, message }
    }
}

impl<C: SendRaw> SpiDevice for HardwareSpiDevice<C> {
    fn open(&mut self) -> Result<()> {
        HardwareSpiDevice::open(self)
    }

    fn close(&mut self) -> Result<()> {
        HardwareSpiDevice::close(self)
    }

    fn is_open(&self) -> bool {
        HardwareSpiDevice::is_open(self)
    }

    fn transfer(&mut self, tx: &[u8]) -> Result<Vec<u8>> {
        HardwareSpiDevice::transfer(self, tx)
    }
}
