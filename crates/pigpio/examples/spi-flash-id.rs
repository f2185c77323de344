//! Reads the JEDEC id of an SPI flash chip on hardware channel 0.
//!
//! Run against a local daemon:
//!   cargo run --example spi-flash-id

use pigpio::client::Client;
use pigpio::spi::HardwareSpiDevice;
use pigpio::transport::DEFAULT_DAEMON_ADDR;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let client = Client::connect(DEFAULT_DAEMON_ADDR)?;

    let mut flash = HardwareSpiDevice::new(client, 0, 1_000_000);
    flash.open()?;

    // 0x9F = read identification; three id bytes clock back.
    let reply = flash.transfer(&[0x9F, 0, 0, 0])?;
    eprintln!("JEDEC id: {:02x?}", &reply[1..]);

    flash.close()?;
    Ok(())
}
