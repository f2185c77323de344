use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Default address the pigpio daemon listens on.
pub const DEFAULT_DAEMON_ADDR: &str = "127.0.0.1:8888";

/// A connected daemon socket — implements Read + Write.
///
/// The protocol is strict request/response with no pipelining, so the
/// stream is created with `TCP_NODELAY` set: every request must leave
/// immediately or the reply stalls a full Nagle window.
pub struct DaemonStream {
    inner: DaemonStreamInner,
}

enum DaemonStreamInner {
    Tcp(TcpStream),
}

impl Read for DaemonStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            DaemonStreamInner::Tcp(stream) => stream.read(buf),
        }
    }
}

impl Write for DaemonStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            DaemonStreamInner::Tcp(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            DaemonStreamInner::Tcp(stream) => stream.flush(),
        }
    }
}

impl DaemonStream {
    /// Connect to the daemon (blocking).
    ///
    /// Candidates from `addr` are tried in order; the error of the last
    /// failed candidate is returned if none succeeds.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let candidates = addr.to_socket_addrs().map_err(TransportError::Resolve)?;

        let mut last_err = None;
        for candidate in candidates {
            match TcpStream::connect(candidate) {
                Ok(stream) => return Self::from_tcp(stream, candidate),
                Err(err) => {
                    debug!(addr = %candidate, error = %err, "connect attempt failed");
                    last_err = Some(TransportError::Connect {
                        addr: candidate,
                        source: err,
                    });
                }
            }
        }

        Err(last_err.unwrap_or(TransportError::NoAddress))
    }

    /// Connect to a single address with a connection timeout (blocking).
    pub fn connect_timeout(addr: &SocketAddr, timeout: Duration) -> Result<Self> {
        let stream =
            TcpStream::connect_timeout(addr, timeout).map_err(|e| TransportError::Connect {
                addr: *addr,
                source: e,
            })?;
        Self::from_tcp(stream, *addr)
    }

    fn from_tcp(stream: TcpStream, addr: SocketAddr) -> Result<Self> {
        stream.set_nodelay(true)?;
        info!(%addr, "connected to pigpio daemon");
        Ok(Self {
            inner: DaemonStreamInner::Tcp(stream),
        })
    }

    /// Set read timeout on the underlying socket.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            DaemonStreamInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying socket.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            DaemonStreamInner::Tcp(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            DaemonStreamInner::Tcp(stream) => {
                let cloned = stream.try_clone()?;
                Ok(Self {
                    inner: DaemonStreamInner::Tcp(cloned),
                })
            }
        }
    }

    /// The daemon address this stream is connected to.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        match &self.inner {
            DaemonStreamInner::Tcp(stream) => stream.peer_addr().map_err(Into::into),
        }
    }
}

impl std::fmt::Debug for DaemonStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            DaemonStreamInner::Tcp(stream) => f
                .debug_struct("DaemonStream")
                .field("type", &"tcp")
                .field("peer", &stream.peer_addr().ok())
                .finish(),
        }
    }
}
