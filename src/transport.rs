use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

/// The narrow stream interface the connection is built on.
///
/// `read` and `write` either complete in full or fail; there is no partial-progress
/// variant. This lets a real socket and an in-memory test double share the exact same
/// contract, with the test double free to simulate a peer without any networking.
pub trait Transport {
    fn connect(host: &str, port: u16) -> std::io::Result<Self>
    where
        Self: Sized;

    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<()>;

    fn write(&mut self, buf: &[u8]) -> std::io::Result<()>;

    fn close(&mut self) -> std::io::Result<()>;
}

/// A blocking TCP socket, the only transport family this driver supports.
pub struct TcpTransport {
    stream: TcpStream,
}

impl Transport for TcpTransport {
    fn connect(host: &str, port: u16) -> std::io::Result<Self> {
        let stream = TcpStream::connect((host, port))?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
        self.stream.read_exact(buf)
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(buf)
    }

    fn close(&mut self) -> std::io::Result<()> {
        self.stream.shutdown(std::net::Shutdown::Both)
    }
}

impl TcpTransport {
    /// Sets both the read and write timeouts on the underlying socket. The core
    /// doesn't implement timeouts of its own (see the connection's doc comment); this
    /// is the hook a caller uses to get them.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()> {
        self.stream.set_read_timeout(timeout)?;
        self.stream.set_write_timeout(timeout)
    }
}

/// An in-memory stand-in for a socket, fed with the exact byte sequences the server
/// would send and recording everything the driver writes.
///
/// Gated behind the `mock-transport` feature (also enabled implicitly under `#[cfg(test)]`
/// for this crate's own unit tests) so the scenario suite under `tests/` can drive a
/// [`Connection`](crate::Connection) without a real server, the same way the teacher
/// project's test support crate does for its own transports.
#[cfg(any(test, feature = "mock-transport"))]
pub mod mock {
    use super::Transport;
    use std::collections::VecDeque;
    use std::io;

    /// `connect` always succeeds; feed scripted server bytes via [`MockTransport::push_read`]
    /// before handing the transport to a connection.
    #[derive(Default)]
    pub struct MockTransport {
        inbound: VecDeque<u8>,
        pub outbound: Vec<u8>,
        closed: bool,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_read(&mut self, bytes: &[u8]) {
            self.inbound.extend(bytes.iter().copied());
        }

        pub fn is_closed(&self) -> bool {
            self.closed
        }
    }

    impl Transport for MockTransport {
        fn connect(_host: &str, _port: u16) -> io::Result<Self> {
            Ok(Self::new())
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<()> {
            if self.inbound.len() < buf.len() {
                return Err(io::ErrorKind::UnexpectedEof.into());
            }
            for slot in buf.iter_mut() {
                *slot = self.inbound.pop_front().unwrap();
            }
            Ok(())
        }

        fn write(&mut self, buf: &[u8]) -> io::Result<()> {
            self.outbound.extend_from_slice(buf);
            Ok(())
        }

        fn close(&mut self) -> io::Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn it_replays_scripted_reads_in_order() {
            let mut t = MockTransport::new();
            t.push_read(&[1, 2, 3, 4]);

            let mut buf = [0u8; 2];
            t.read(&mut buf).unwrap();
            assert_eq!(buf, [1, 2]);

            t.read(&mut buf).unwrap();
            assert_eq!(buf, [3, 4]);

            assert!(t.read(&mut buf).is_err());
        }

        #[test]
        fn it_records_writes_for_later_assertions() {
            let mut t = MockTransport::new();
            t.write(b"hello").unwrap();
            assert_eq!(t.outbound, b"hello");
        }
    }
}
