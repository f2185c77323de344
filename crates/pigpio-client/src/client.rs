use std::io::{ErrorKind, Read, Write};
use std::net::ToSocketAddrs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use pigpio_protocol::{encode_request, Request, Response, RESPONSE_SIZE};
use pigpio_transport::DaemonStream;
use tracing::debug;

use crate::error::{ClientError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Default upper bound on extension replies accepted from the daemon: 1 MiB.
pub const DEFAULT_MAX_EXTENSION_REPLY: usize = 1024 * 1024;

/// Configuration for a [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Read timeout applied to the socket.
    pub read_timeout: Option<Duration>,
    /// Write timeout applied to the socket.
    pub write_timeout: Option<Duration>,
    /// Maximum accepted extension-reply size in bytes.
    pub max_extension_reply: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            read_timeout: None,
            write_timeout: None,
            max_extension_reply: DEFAULT_MAX_EXTENSION_REPLY,
        }
    }
}

/// The one operation device code consumes: send a request frame, receive
/// the matching response frame, atomically per call.
///
/// The connection carries no request identifiers and no multiplexing, so
/// calls must be serialized — one outstanding request/response pair at a
/// time. Concurrent use of one connection without external serialization
/// is undefined; wrap a [`Client`] in `Arc<Mutex<_>>` to share it across
/// devices or threads.
pub trait SendRaw {
    /// Send one request and read the 4-byte result reply.
    fn send_raw(&mut self, request: &Request) -> Result<Response>;

    /// Send one request and read the result reply plus, when the result
    /// is positive, that many trailing data bytes.
    fn send_raw_ext(&mut self, request: &Request) -> Result<(i32, Bytes)>;
}

impl<T: SendRaw + ?Sized> SendRaw for &mut T {
    fn send_raw(&mut self, request: &Request) -> Result<Response> {
        (**self).send_raw(request)
    }

    fn send_raw_ext(&mut self, request: &Request) -> Result<(i32, Bytes)> {
        (**self).send_raw_ext(request)
    }
}

impl<T: SendRaw + ?Sized> SendRaw for Arc<Mutex<T>> {
    fn send_raw(&mut self, request: &Request) -> Result<Response> {
        let mut guard = self.lock().map_err(|_| ClientError::Poisoned)?;
        guard.send_raw(request)
    }

    fn send_raw_ext(&mut self, request: &Request) -> Result<(i32, Bytes)> {
        let mut guard = self.lock().map_err(|_| ClientError::Poisoned)?;
        guard.send_raw_ext(request)
    }
}

/// A connected transport client.
///
/// Owns the daemon stream and a reused encode buffer. Generic over the
/// stream so the exchange discipline can be tested against in-memory
/// streams; production code uses [`DaemonStream`].
pub struct Client<S = DaemonStream> {
    stream: S,
    buf: BytesMut,
    config: ClientConfig,
}

impl Client {
    /// Connect to the daemon at `addr` with default configuration.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        Self::connect_with_config(addr, ClientConfig::default())
    }

    /// Connect to the daemon with explicit configuration.
    pub fn connect_with_config(addr: impl ToSocketAddrs, config: ClientConfig) -> Result<Self> {
        let stream = DaemonStream::connect(addr)?;
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;
        Ok(Self::from_stream_with_config(stream, config))
    }
}

impl<S: Read + Write> Client<S> {
    /// Wrap an already-connected stream with default configuration.
    pub fn from_stream(stream: S) -> Self {
        Self::from_stream_with_config(stream, ClientConfig::default())
    }

    /// Wrap an already-connected stream with explicit configuration.
    pub fn from_stream_with_config(stream: S, config: ClientConfig) -> Self {
        Self {
            stream,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Consume the client and return the inner stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Current client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn write_request(&mut self, request: &Request) -> Result<()> {
        self.buf.clear();
        encode_request(request, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.stream.write(&self.buf[offset..]) {
                Ok(0) => return Err(ClientError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(ClientError::Io(err)),
            }
        }

        loop {
            match self.stream.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(ClientError::Io(err)),
            }
        }
    }

    fn read_exact_retrying(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => return Err(ClientError::ConnectionClosed),
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ClientError::Io(err)),
            }
        }
        Ok(())
    }

    fn read_response(&mut self) -> Result<Response> {
        let mut reply = [0u8; RESPONSE_SIZE];
        self.read_exact_retrying(&mut reply)?;
        Ok(Response::from_le_bytes(reply))
    }
}

impl<S: Read + Write> SendRaw for Client<S> {
    fn send_raw(&mut self, request: &Request) -> Result<Response> {
        self.write_request(request)?;
        let response = self.read_response()?;
        debug!(
            command = request.command.name(),
            result = response.result,
            "exchange complete"
        );
        Ok(response)
    }

    fn send_raw_ext(&mut self, request: &Request) -> Result<(i32, Bytes)> {
        self.write_request(request)?;
        let response = self.read_response()?;
        if response.result <= 0 {
            return Ok((response.result, Bytes::new()));
        }

        let len = response.result as usize;
        if len > self.config.max_extension_reply {
            return Err(ClientError::ExtensionReplyTooLarge {
                size: len,
                max: self.config.max_extension_reply,
            });
        }

        let mut data = vec![0u8; len];
        self.read_exact_retrying(&mut data)?;
        debug!(
            command = request.command.name(),
            bytes = len,
            "extension exchange complete"
        );
        Ok((response.result, Bytes::from(data)))
    }
}

#[cfg(test)]
mod tests {
    use pigpio_protocol::{Command, Extension, REQUEST_HEADER_SIZE};

    use super::*;

    /// In-memory duplex: replies are scripted, written bytes recorded.
    struct ScriptedStream {
        reply: Vec<u8>,
        read_pos: usize,
        written: Vec<u8>,
    }

    impl ScriptedStream {
        fn replying(reply: impl Into<Vec<u8>>) -> Self {
            Self {
                reply: reply.into(),
                read_pos: 0,
                written: Vec::new(),
            }
        }
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.read_pos >= self.reply.len() {
                return Ok(0);
            }
            let n = (self.reply.len() - self.read_pos).min(buf.len());
            buf[..n].copy_from_slice(&self.reply[self.read_pos..self.read_pos + n]);
            self.read_pos += n;
            Ok(n)
        }
    }

    impl Write for ScriptedStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_exact_frame_and_reads_result() {
        let stream = ScriptedStream::replying(0i32.to_le_bytes());
        let mut client = Client::from_stream(stream);

        let request = Request::with_extension(
            Command::BbSpiOpen,
            6,
            0,
            Extension::words([8, 21, 22, 32000, 32]),
        );
        let response = client.send_raw(&request).unwrap();
        assert_eq!(response, Response::new(0));

        let written = &client.into_inner().written;
        assert_eq!(written.len(), REQUEST_HEADER_SIZE + 20);
        assert_eq!(&written[0..4], &[112, 0, 0, 0]);
        assert_eq!(&written[4..8], &[6, 0, 0, 0]);
        assert_eq!(&written[12..16], &[20, 0, 0, 0]);
    }

    #[test]
    fn negative_result_passes_through() {
        let stream = ScriptedStream::replying((-141i32).to_le_bytes());
        let mut client = Client::from_stream(stream);

        let response = client
            .send_raw(&Request::new(Command::BbSpiClose, 6, 0))
            .unwrap();
        assert_eq!(response.result, -141);
        assert!(response.is_err());
    }

    #[test]
    fn eof_before_reply_is_connection_closed() {
        let stream = ScriptedStream::replying(Vec::new());
        let mut client = Client::from_stream(stream);

        let err = client
            .send_raw(&Request::new(Command::SpiClose, 0, 0))
            .unwrap_err();
        assert!(matches!(err, ClientError::ConnectionClosed));
    }

    #[test]
    fn eof_mid_reply_is_connection_closed() {
        let stream = ScriptedStream::replying(vec![0u8, 0]);
        let mut client = Client::from_stream(stream);

        let err = client
            .send_raw(&Request::new(Command::SpiClose, 0, 0))
            .unwrap_err();
        assert!(matches!(err, ClientError::ConnectionClosed));
    }

    #[test]
    fn extension_reply_returns_data_bytes() {
        let mut reply = 4i32.to_le_bytes().to_vec();
        reply.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let stream = ScriptedStream::replying(reply);
        let mut client = Client::from_stream(stream);

        let request =
            Request::with_extension(Command::SpiTransfer, 0, 0, Extension::data([0, 0, 0, 0]));
        let (result, data) = client.send_raw_ext(&request).unwrap();
        assert_eq!(result, 4);
        assert_eq!(data.as_ref(), &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn extension_reply_negative_result_carries_no_data() {
        let stream = ScriptedStream::replying((-89i32).to_le_bytes());
        let mut client = Client::from_stream(stream);

        let request = Request::with_extension(Command::SpiTransfer, 0, 0, Extension::data([0]));
        let (result, data) = client.send_raw_ext(&request).unwrap();
        assert_eq!(result, -89);
        assert!(data.is_empty());
    }

    #[test]
    fn extension_reply_truncated_is_connection_closed() {
        let mut reply = 8i32.to_le_bytes().to_vec();
        reply.extend_from_slice(&[1, 2, 3]); // daemon dies mid-payload
        let stream = ScriptedStream::replying(reply);
        let mut client = Client::from_stream(stream);

        let request = Request::with_extension(Command::SpiTransfer, 0, 0, Extension::data([0]));
        let err = client.send_raw_ext(&request).unwrap_err();
        assert!(matches!(err, ClientError::ConnectionClosed));
    }

    #[test]
    fn oversized_extension_reply_rejected() {
        let reply = 64i32.to_le_bytes().to_vec();
        let stream = ScriptedStream::replying(reply);
        let config = ClientConfig {
            max_extension_reply: 16,
            ..ClientConfig::default()
        };
        let mut client = Client::from_stream_with_config(stream, config);

        let request = Request::with_extension(Command::SpiTransfer, 0, 0, Extension::data([0]));
        let err = client.send_raw_ext(&request).unwrap_err();
        assert!(matches!(
            err,
            ClientError::ExtensionReplyTooLarge { size: 64, max: 16 }
        ));
    }

    #[test]
    fn zero_length_write_is_connection_closed() {
        struct ZeroWriter;

        impl Read for ZeroWriter {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Ok(0)
            }
        }

        impl Write for ZeroWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut client = Client::from_stream(ZeroWriter);
        let err = client
            .send_raw(&Request::new(Command::SpiClose, 0, 0))
            .unwrap_err();
        assert!(matches!(err, ClientError::ConnectionClosed));
    }

    #[test]
    fn interrupted_write_retries() {
        struct InterruptedOnce {
            interrupted: bool,
            inner: ScriptedStream,
        }

        impl Read for InterruptedOnce {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                self.inner.read(buf)
            }
        }

        impl Write for InterruptedOnce {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                self.inner.write(buf)
            }

            fn flush(&mut self) -> std::io::Result<()> {
                self.inner.flush()
            }
        }

        let stream = InterruptedOnce {
            interrupted: false,
            inner: ScriptedStream::replying(7i32.to_le_bytes()),
        };
        let mut client = Client::from_stream(stream);

        let response = client
            .send_raw(&Request::new(Command::SpiRead, 1, 4))
            .unwrap();
        assert_eq!(response.result, 7);
    }

    #[test]
    fn interrupted_read_retries() {
        struct InterruptedRead {
            interrupted: bool,
            inner: ScriptedStream,
        }

        impl Read for InterruptedRead {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                self.inner.read(buf)
            }
        }

        impl Write for InterruptedRead {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.inner.write(buf)
            }

            fn flush(&mut self) -> std::io::Result<()> {
                self.inner.flush()
            }
        }

        let stream = InterruptedRead {
            interrupted: false,
            inner: ScriptedStream::replying(3i32.to_le_bytes()),
        };
        let mut client = Client::from_stream(stream);

        let response = client
            .send_raw(&Request::new(Command::SpiRead, 1, 4))
            .unwrap();
        assert_eq!(response.result, 3);
    }

    #[test]
    fn shared_client_serializes_through_mutex() {
        let stream = ScriptedStream::replying(0i32.to_le_bytes());
        let client = Client::from_stream(stream);
        let mut shared = Arc::new(Mutex::new(client));

        let response = shared
            .send_raw(&Request::new(Command::SpiClose, 1, 0))
            .unwrap();
        assert_eq!(response, Response::new(0));
    }

    #[test]
    fn accessors_and_into_inner() {
        let stream = ScriptedStream::replying(Vec::new());
        let mut client = Client::from_stream(stream);

        let _ = client.get_ref();
        let _ = client.get_mut();
        assert_eq!(
            client.config().max_extension_reply,
            DEFAULT_MAX_EXTENSION_REPLY
        );
        let _inner = client.into_inner();
    }
}
