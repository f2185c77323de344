use bytes::{Buf, BufMut, BytesMut};

use crate::command::{Command, ExtensionLayout};
use crate::error::{ProtocolError, Result};
use crate::extension::Extension;

/// Request header: opcode (4) + p1 (4) + p2 (4) + extension length (4).
pub const REQUEST_HEADER_SIZE: usize = 16;

/// A command invocation bound for the daemon.
///
/// Two requests compare equal iff command, both parameters and the
/// extension's format-and-values all match; the protocol-compliance
/// tests lean on this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The command to invoke.
    pub command: Command,
    /// First scalar parameter (meaning per command).
    pub p1: u32,
    /// Second scalar parameter (meaning per command).
    pub p2: u32,
    /// Optional packed extension payload.
    pub extension: Option<Extension>,
}

impl Request {
    /// A request with no extension payload.
    pub fn new(command: Command, p1: u32, p2: u32) -> Self {
        Self {
            command,
            p1,
            p2,
            extension: None,
        }
    }

    /// A request carrying an extension payload.
    pub fn with_extension(command: Command, p1: u32, p2: u32, extension: Extension) -> Self {
        Self {
            command,
            p1,
            p2,
            extension: Some(extension),
        }
    }

    /// Total encoded size (header + packed extension).
    pub fn wire_size(&self) -> usize {
        REQUEST_HEADER_SIZE + self.extension.as_ref().map_or(0, Extension::packed_len)
    }
}

/// Encode a request into the daemon's wire format.
///
/// Wire format (all fields little-endian 32-bit words):
/// ```text
/// ┌─────────────┬──────────┬──────────┬─────────────┬──────────────────┐
/// │ opcode (4B) │ p1 (4B)  │ p2 (4B)  │ extLen (4B) │ extension bytes  │
/// └─────────────┴──────────┴──────────┴─────────────┴──────────────────┘
/// ```
///
/// Deterministic and side-effect-free: the same request always produces
/// the same bytes.
pub fn encode_request(request: &Request, dst: &mut BytesMut) -> Result<()> {
    let ext_len = request.extension.as_ref().map_or(0, Extension::packed_len);
    if ext_len > u32::MAX as usize {
        return Err(ProtocolError::ExtensionTooLarge {
            size: ext_len,
            max: u32::MAX as usize,
        });
    }

    dst.reserve(REQUEST_HEADER_SIZE + ext_len);
    dst.put_u32_le(request.command.opcode());
    dst.put_u32_le(request.p1);
    dst.put_u32_le(request.p2);
    dst.put_u32_le(ext_len as u32);
    if let Some(extension) = &request.extension {
        extension.pack(dst);
    }
    Ok(())
}

/// Decode a request from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete request
/// yet. On success, consumes the request bytes from the buffer. The
/// extension is recovered using the command's documented field layout;
/// the result round-trips exactly with [`encode_request`].
pub fn decode_request(src: &mut BytesMut) -> Result<Option<Request>> {
    if src.len() < REQUEST_HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let opcode = u32::from_le_bytes(src[0..4].try_into().unwrap());
    let command =
        Command::from_opcode(opcode).ok_or(ProtocolError::UnknownOpcode(opcode))?;
    let p1 = u32::from_le_bytes(src[4..8].try_into().unwrap());
    let p2 = u32::from_le_bytes(src[8..12].try_into().unwrap());
    let ext_len = u32::from_le_bytes(src[12..16].try_into().unwrap()) as usize;

    let total = REQUEST_HEADER_SIZE + ext_len;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    src.advance(REQUEST_HEADER_SIZE);
    let ext_bytes = src.split_to(ext_len);

    let extension = match command.extension_layout() {
        ExtensionLayout::None => {
            if ext_len != 0 {
                return Err(ProtocolError::UnexpectedExtension {
                    command: command.name(),
                    len: ext_len,
                });
            }
            None
        }
        ExtensionLayout::Words => {
            if ext_len % 4 != 0 {
                return Err(ProtocolError::BadExtensionLength {
                    command: command.name(),
                    len: ext_len,
                });
            }
            if ext_len == 0 {
                None
            } else {
                Some(Extension::words(
                    ext_bytes
                        .chunks_exact(4)
                        .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap())),
                ))
            }
        }
        ExtensionLayout::Bytes => {
            if ext_len == 0 {
                None
            } else {
                Some(Extension::data(&ext_bytes))
            }
        }
    };

    Ok(Some(Request {
        command,
        p1,
        p2,
        extension,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_plain_request() {
        let request = Request::new(Command::BbSpiClose, 6, 0);
        let mut buf = BytesMut::new();
        encode_request(&request, &mut buf).unwrap();

        assert_eq!(buf.len(), REQUEST_HEADER_SIZE);
        assert_eq!(
            buf.as_ref(),
            &[
                111, 0, 0, 0, // BSPIC
                6, 0, 0, 0, // p1 = channel
                0, 0, 0, 0, // p2
                0, 0, 0, 0, // no extension
            ]
        );
    }

    #[test]
    fn encode_extension_request() {
        let request = Request::with_extension(
            Command::BbSpiOpen,
            6,
            0,
            Extension::words([8, 21, 22, 32000, 32]),
        );
        let mut buf = BytesMut::new();
        encode_request(&request, &mut buf).unwrap();

        assert_eq!(buf.len(), REQUEST_HEADER_SIZE + 20);
        assert_eq!(request.wire_size(), buf.len());
        assert_eq!(&buf[0..4], &[112, 0, 0, 0]); // BSPIO
        assert_eq!(&buf[12..16], &[20, 0, 0, 0]); // extLen
        assert_eq!(&buf[16..20], &[8, 0, 0, 0]); // chip-select pin
        assert_eq!(&buf[28..32], &[0x00, 0x7D, 0x00, 0x00]); // baud 32000
        assert_eq!(&buf[32..36], &[32, 0, 0, 0]); // MOSI pin
    }

    #[test]
    fn encode_is_deterministic() {
        let request =
            Request::with_extension(Command::SpiOpen, 1, 0, Extension::words([512000, 0]));

        let mut first = BytesMut::new();
        let mut second = BytesMut::new();
        encode_request(&request, &mut first).unwrap();
        encode_request(&request, &mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn roundtrip_word_extension() {
        let original = Request::with_extension(
            Command::BbSpiOpen,
            6,
            0,
            Extension::words([8, 21, 22, 32000, 32]),
        );
        let mut buf = BytesMut::new();
        encode_request(&original, &mut buf).unwrap();

        let decoded = decode_request(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, original);
        assert!(buf.is_empty());
    }

    #[test]
    fn roundtrip_byte_extension() {
        let original =
            Request::with_extension(Command::SpiTransfer, 3, 0, Extension::data([0x9F, 0, 0, 0]));
        let mut buf = BytesMut::new();
        encode_request(&original, &mut buf).unwrap();

        let decoded = decode_request(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn roundtrip_plain_request() {
        let original = Request::new(Command::SpiRead, 2, 16);
        let mut buf = BytesMut::new();
        encode_request(&original, &mut buf).unwrap();

        let decoded = decode_request(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn decode_incomplete_header() {
        let mut buf = BytesMut::from(&[112u8, 0, 0][..]);
        assert!(decode_request(&mut buf).unwrap().is_none());
    }

    #[test]
    fn decode_incomplete_extension() {
        let request = Request::with_extension(Command::BbSpiOpen, 6, 0, Extension::words([8]));
        let mut buf = BytesMut::new();
        encode_request(&request, &mut buf).unwrap();
        buf.truncate(REQUEST_HEADER_SIZE + 2);

        assert!(decode_request(&mut buf).unwrap().is_none());
    }

    #[test]
    fn decode_unknown_opcode() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(9999);
        buf.put_u32_le(0);
        buf.put_u32_le(0);
        buf.put_u32_le(0);

        let err = decode_request(&mut buf).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownOpcode(9999)));
    }

    #[test]
    fn decode_rejects_extension_on_plain_command() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(Command::SpiClose.opcode());
        buf.put_u32_le(0);
        buf.put_u32_le(0);
        buf.put_u32_le(4);
        buf.put_u32_le(0xDEAD);

        let err = decode_request(&mut buf).unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedExtension { .. }));
    }

    #[test]
    fn decode_rejects_ragged_word_extension() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(Command::BbSpiOpen.opcode());
        buf.put_u32_le(6);
        buf.put_u32_le(0);
        buf.put_u32_le(3);
        buf.put_slice(&[1, 2, 3]);

        let err = decode_request(&mut buf).unwrap_err();
        assert!(matches!(err, ProtocolError::BadExtensionLength { len: 3, .. }));
    }

    #[test]
    fn decode_multiple_requests() {
        let first = Request::new(Command::SpiClose, 1, 0);
        let second = Request::with_extension(Command::SpiWrite, 1, 0, Extension::data([0xAA]));

        let mut buf = BytesMut::new();
        encode_request(&first, &mut buf).unwrap();
        encode_request(&second, &mut buf).unwrap();

        assert_eq!(decode_request(&mut buf).unwrap().unwrap(), first);
        assert_eq!(decode_request(&mut buf).unwrap().unwrap(), second);
        assert!(buf.is_empty());
    }

    #[test]
    fn frame_equality_contract() {
        let base = Request::with_extension(
            Command::BbSpiOpen,
            6,
            0,
            Extension::words([8, 21, 22, 32000, 32]),
        );

        // Equal only when opcode, both params and the extension all match.
        assert_eq!(
            base,
            Request::with_extension(
                Command::BbSpiOpen,
                6,
                0,
                Extension::words([8, 21, 22, 32000, 32]),
            )
        );
        assert_ne!(base, Request::new(Command::BbSpiOpen, 6, 0));
        assert_ne!(
            base,
            Request::with_extension(
                Command::BbSpiOpen,
                7,
                0,
                Extension::words([8, 21, 22, 32000, 32]),
            )
        );
        assert_ne!(
            base,
            Request::with_extension(
                Command::BbSpiOpen,
                6,
                0,
                Extension::words([8, 21, 22, 32001, 32]),
            )
        );
    }
}
