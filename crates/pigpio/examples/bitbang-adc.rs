//! Samples channel 0 of an MCP3008 ADC wired to arbitrary GPIO pins,
//! using the daemon's software bit-banging SPI.
//!
//! Run against a local daemon:
//!   cargo run --example bitbang-adc

use std::sync::{Arc, Mutex};

use pigpio::client::Client;
use pigpio::spi::BitBangSpiDevice;
use pigpio::transport::DEFAULT_DAEMON_ADDR;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let client = Client::connect(DEFAULT_DAEMON_ADDR)?;
    // Shared so further devices could ride the same connection.
    let client = Arc::new(Mutex::new(client));

    let mut adc = BitBangSpiDevice::new(Arc::clone(&client), 100_000, 0, 8, 11, 9, 10);
    adc.open()?;

    // MCP3008: start bit, single-ended channel 0, then clock out the
    // 10-bit sample.
    let reply = adc.transfer(&[0x01, 0x80, 0x00])?;
    let sample = (u16::from(reply[1] & 0x03) << 8) | u16::from(reply[2]);
    eprintln!("channel 0 reads {sample}");

    adc.close()?;
    Ok(())
}
