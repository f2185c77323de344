//! Binary request/response protocol spoken by the pigpio daemon.
//!
//! Every request is a fixed 16-byte header — command opcode, two scalar
//! parameters and the extension byte length, all little-endian 32-bit
//! words — optionally followed by a packed extension payload. Every reply
//! is a single little-endian signed 32-bit result: non-negative on
//! success, a daemon error code below zero.
//!
//! This crate is pure codec; it performs no I/O.

pub mod command;
pub mod error;
pub mod extension;
pub mod request;
pub mod response;

pub use command::{Command, ExtensionLayout};
pub use error::{ProtocolError, Result};
pub use extension::{Extension, ExtensionField};
pub use request::{decode_request, encode_request, Request, REQUEST_HEADER_SIZE};
pub use response::{decode_response, Response, RESPONSE_SIZE};
