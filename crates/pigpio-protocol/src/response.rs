use bytes::{Buf, BytesMut};

/// Reply size: one little-endian signed 32-bit result.
pub const RESPONSE_SIZE: usize = 4;

/// A decoded daemon reply.
///
/// Non-negative results are success values whose meaning varies by
/// command — a handle, a byte count, or plain zero. Negative results are
/// daemon error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    /// The raw result word.
    pub result: i32,
}

impl Response {
    /// Wrap a raw result.
    pub const fn new(result: i32) -> Self {
        Self { result }
    }

    /// Decode a response from its exact wire bytes.
    pub const fn from_le_bytes(bytes: [u8; RESPONSE_SIZE]) -> Self {
        Self::new(i32::from_le_bytes(bytes))
    }

    /// True for success results (`result >= 0`).
    pub const fn is_ok(self) -> bool {
        self.result >= 0
    }

    /// True for daemon error codes (`result < 0`).
    pub const fn is_err(self) -> bool {
        self.result < 0
    }
}

/// Decode a response from a buffer.
///
/// Returns `None` until the full 4 reply bytes are present. On success,
/// consumes the response bytes from the buffer.
pub fn decode_response(src: &mut BytesMut) -> Option<Response> {
    if src.len() < RESPONSE_SIZE {
        return None; // Need more data
    }
    Some(Response::new(src.get_i32_le()))
}
