use crate::error::Result;

/// The capability shared by both SPI device flavours.
///
/// `open` and `close` are idempotent: calling either while already in the
/// target state is a no-op that skips the network entirely. A failed open
/// or close leaves the state untouched.
pub trait SpiDevice {
    /// Open the device. Success transitions Closed → Open.
    fn open(&mut self) -> Result<()>;

    /// Close the device. Success transitions Open → Closed.
    fn close(&mut self) -> Result<()>;

    /// Whether the device is currently open. Pure state query, no I/O.
    fn is_open(&self) -> bool;

    /// Full-duplex transfer: clock `tx` out and return the bytes read
    /// back. Requires an open device.
    fn transfer(&mut self, tx: &[u8]) -> Result<Vec<u8>>;
}
