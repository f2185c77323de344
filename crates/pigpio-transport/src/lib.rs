//! Socket transport to the pigpio daemon.
//!
//! The daemon listens on a TCP socket (`127.0.0.1:8888` unless configured
//! otherwise) and speaks a fixed-layout binary protocol. This crate owns
//! connection establishment and raw byte I/O; everything above it works in
//! terms of the [`DaemonStream`] type provided here.

pub mod error;
pub mod stream;

pub use error::{Result, TransportError};
pub use stream::{DaemonStream, DEFAULT_DAEMON_ADDR};
