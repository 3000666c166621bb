//! Sockets for talking to name servers.
//!
//! A [`Transport`] hands out the UDP sockets and TCP streams the resolver
//! needs. Sockets are identified by the local address, the remote
//! address, and the protocol. If the transport is persistent for a
//! protocol, the sockets are kept around and reused by later queries.
//!
//! The module also contains the helpers for the framing of DNS messages
//! over TCP, where each message is preceded by its length as a 16 bit
//! big-endian integer.

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::net::{
    IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, UdpSocket,
};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

//------------ SocketKey -----------------------------------------------------

/// The key identifying a cached socket.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct SocketKey {
    local: SocketAddr,
    remote: SocketAddr,
    tcp: bool,
}

//------------ Transport -----------------------------------------------------

/// The sockets of a resolver.
#[derive(Debug)]
pub struct Transport {
    /// The local address to bind sockets to.
    srcaddr: IpAddr,

    /// The local port to bind sockets to.
    srcport: u16,

    /// Keep UDP sockets around.
    persistent_udp: bool,

    /// Keep TCP streams around.
    persistent_tcp: bool,

    /// The cached sockets.
    udp: HashMap<SocketKey, UdpSocket>,

    /// The cached streams.
    tcp: HashMap<SocketKey, TcpStream>,
}

impl Transport {
    /// Creates a new transport.
    pub fn new(
        srcaddr: IpAddr,
        srcport: u16,
        persistent_udp: bool,
        persistent_tcp: bool,
    ) -> Self {
        Transport {
            srcaddr,
            srcport,
            persistent_udp,
            persistent_tcp,
            udp: HashMap::new(),
            tcp: HashMap::new(),
        }
    }

    /// Changes whether sockets are kept around.
    ///
    /// Switching persistence off drops the cached sockets.
    pub fn set_persistent(&mut self, udp: bool, tcp: bool) {
        self.persistent_udp = udp;
        self.persistent_tcp = tcp;
        if !udp {
            self.udp.clear()
        }
        if !tcp {
            self.tcp.clear()
        }
    }

    /// Returns the number of cached sockets.
    pub fn cached(&self) -> usize {
        self.udp.len() + self.tcp.len()
    }

    /// Drops all cached sockets.
    pub fn close(&mut self) {
        self.udp.clear();
        self.tcp.clear();
    }

    /// Returns the local address to use for talking to `remote`.
    ///
    /// If the configured source address is of a different family than the
    /// remote address, the unspecified address of the right family is
    /// used instead.
    fn local_addr(&self, remote: SocketAddr) -> SocketAddr {
        let addr = match (self.srcaddr, remote) {
            (IpAddr::V4(_), SocketAddr::V4(_))
            | (IpAddr::V6(_), SocketAddr::V6(_)) => self.srcaddr,
            (_, SocketAddr::V4(_)) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            (_, SocketAddr::V6(_)) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        SocketAddr::new(addr, self.srcport)
    }

    /// Returns the source address and port sockets are bound to.
    pub fn source(&self) -> (IpAddr, u16) {
        (self.srcaddr, self.srcport)
    }

    /// Returns a UDP socket for sending to `remote`.
    pub fn udp(&mut self, remote: SocketAddr) -> io::Result<UdpSocket> {
        let key = SocketKey {
            local: self.local_addr(remote),
            remote,
            tcp: false,
        };
        if let Some(sock) = self.udp.get(&key) {
            trace!("reusing UDP socket for {}", remote);
            return sock.try_clone();
        }
        let sock = self.bind_udp(remote)?;
        if self.persistent_udp {
            self.udp.insert(key, sock.try_clone()?);
        }
        Ok(sock)
    }

    /// Returns a new UDP socket for sending to `remote`.
    ///
    /// The socket is never cached.
    pub fn bind_udp(&self, remote: SocketAddr) -> io::Result<UdpSocket> {
        let sock = Socket::new(
            Domain::for_address(remote),
            Type::DGRAM,
            Some(Protocol::UDP),
        )?;
        sock.bind(&SockAddr::from(self.local_addr(remote)))?;
        Ok(sock.into())
    }

    /// Returns a TCP stream connected to `remote`.
    ///
    /// A new connection has to be established within `timeout`.
    pub fn tcp(
        &mut self,
        remote: SocketAddr,
        timeout: Duration,
    ) -> io::Result<TcpStream> {
        let key = SocketKey {
            local: self.local_addr(remote),
            remote,
            tcp: true,
        };
        if let Some(stream) = self.tcp.get(&key) {
            trace!("reusing TCP connection to {}", remote);
            return stream.try_clone();
        }
        debug!("connecting to {} over TCP", remote);
        let sock = Socket::new(
            Domain::for_address(remote),
            Type::STREAM,
            Some(Protocol::TCP),
        )?;
        if !key.local.ip().is_unspecified() || key.local.port() != 0 {
            sock.bind(&SockAddr::from(key.local))?;
        }
        sock.connect_timeout(&SockAddr::from(remote), nonzero(timeout))?;
        sock.set_nodelay(true)?;
        let stream = TcpStream::from(sock);
        if self.persistent_tcp {
            self.tcp.insert(key, stream.try_clone()?);
        }
        Ok(stream)
    }

    /// Forgets a cached TCP stream after a failure.
    pub fn drop_tcp(&mut self, remote: SocketAddr) {
        self.tcp.retain(|key, _| key.remote != remote)
    }
}

//------------ UDP Helpers ---------------------------------------------------

/// Waits for a datagram on `sock` for at most `timeout`.
///
/// Returns `Ok(None)` if nothing arrived in time.
pub fn recv_udp(
    sock: &UdpSocket,
    buf: &mut [u8],
    timeout: Duration,
) -> io::Result<Option<(usize, SocketAddr)>> {
    sock.set_read_timeout(Some(nonzero(timeout)))?;
    match sock.recv_from(buf) {
        Ok(res) => Ok(Some(res)),
        Err(err) if is_timeout(&err) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Returns whether an IO error is a timeout.
///
/// Depending on the platform, running into a socket read timeout results
/// in either kind.
pub fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Socket timeouts can’t be zero.
fn nonzero(timeout: Duration) -> Duration {
    timeout.max(Duration::from_millis(1))
}

//------------ TCP Framing ---------------------------------------------------

/// Writes a message with its length prefix.
pub fn write_frame<W: Write>(stream: &mut W, msg: &[u8]) -> io::Result<()> {
    let len = u16::try_from(msg.len()).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "message too long")
    })?;
    let mut buf = Vec::with_capacity(msg.len() + 2);
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(msg);
    stream.write_all(&buf)?;
    stream.flush()
}

/// Reads a length-prefixed message that must arrive before `deadline`.
///
/// Short reads are repeated until the message is complete. If the peer
/// closes the connection early, the error says how many octets were
/// expected and how many were received. Running out of time results in
/// an error of kind `TimedOut`.
pub fn read_frame(
    stream: &mut TcpStream,
    deadline: Instant,
) -> io::Result<Vec<u8>> {
    let mut len = [0u8; 2];
    let got = read_full(stream, &mut len, deadline)?;
    if got < len.len() {
        return Err(short_read(len.len(), got));
    }
    let len = usize::from(u16::from_be_bytes(len));
    let mut buf = vec![0u8; len];
    let got = read_full(stream, &mut buf, deadline)?;
    if got < len {
        return Err(short_read(len, got));
    }
    Ok(buf)
}

/// Reads into `buf` until it is full, the stream ends, or time is up.
///
/// Returns the number of octets read, which is less than the length of
/// `buf` only if the stream ended.
pub fn read_full(
    stream: &mut TcpStream,
    buf: &mut [u8],
    deadline: Instant,
) -> io::Result<usize> {
    let mut pos = 0;
    while pos < buf.len() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(io::ErrorKind::TimedOut.into());
        }
        stream.set_read_timeout(Some(nonzero(remaining)))?;
        match stream.read(&mut buf[pos..]) {
            Ok(0) => break,
            Ok(n) => pos += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) if is_timeout(&err) => {
                return Err(io::ErrorKind::TimedOut.into())
            }
            Err(err) => return Err(err),
        }
    }
    Ok(pos)
}

fn short_read(expected: usize, received: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("expected {} bytes, received {}", expected, received),
    )
}

//------------ Readiness -----------------------------------------------------

/// Checks which of the given sockets have data waiting.
///
/// Waits at most `timeout` for at least one of them to become readable.
/// Returns one flag per socket.
#[cfg(unix)]
pub fn poll_readable(
    fds: &[std::os::unix::io::RawFd],
    timeout: Duration,
) -> io::Result<Vec<bool>> {
    let mut pollfds: Vec<libc::pollfd> = fds
        .iter()
        .map(|&fd| libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        })
        .collect();
    let timeout = libc::c_int::try_from(timeout.as_millis())
        .unwrap_or(libc::c_int::MAX);
    let res = unsafe {
        libc::poll(
            pollfds.as_mut_ptr(),
            pollfds.len() as libc::nfds_t,
            timeout,
        )
    };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(pollfds
        .iter()
        .map(|fd| fd.revents & (libc::POLLIN | libc::POLLERR) != 0)
        .collect())
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    fn localhost() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    #[test]
    fn frames() {
        let listener = TcpListener::bind(localhost()).unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let deadline = Instant::now() + Duration::from_secs(5);
            let msg = read_frame(&mut stream, deadline).unwrap();
            // Echo back in two pieces, then send a short frame.
            let mut framed = (msg.len() as u16).to_be_bytes().to_vec();
            framed.extend_from_slice(&msg);
            stream.write_all(&framed[..3]).unwrap();
            stream.flush().unwrap();
            thread::sleep(Duration::from_millis(20));
            stream.write_all(&framed[3..]).unwrap();
            stream.write_all(b"\x00\x10abc").unwrap();
        });

        let mut transport =
            Transport::new(localhost().ip(), 0, false, false);
        let mut stream = transport.tcp(addr, Duration::from_secs(5)).unwrap();
        write_frame(&mut stream, b"hello world").unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        assert_eq!(read_frame(&mut stream, deadline).unwrap(), b"hello world");
        server.join().unwrap();
        let err = read_frame(&mut stream, deadline).unwrap_err();
        assert_eq!(err.to_string(), "expected 16 bytes, received 3");
        assert_eq!(transport.cached(), 0);
    }

    #[test]
    fn persistent_udp() {
        let server = UdpSocket::bind(localhost()).unwrap();
        let addr = server.local_addr().unwrap();
        let mut transport = Transport::new(localhost().ip(), 0, true, false);
        let first = transport.udp(addr).unwrap();
        let second = transport.udp(addr).unwrap();
        assert_eq!(first.local_addr().unwrap(), second.local_addr().unwrap());
        assert_eq!(transport.cached(), 1);

        first.send_to(b"ping", addr).unwrap();
        let mut buf = [0u8; 16];
        let (len, from) = server.recv_from(&mut buf).unwrap();
        server.send_to(&buf[..len], from).unwrap();
        let (len, _) = recv_udp(&second, &mut buf, Duration::from_secs(5))
            .unwrap()
            .unwrap();
        assert_eq!(&buf[..len], b"ping");
        assert!(recv_udp(&second, &mut buf, Duration::from_millis(10))
            .unwrap()
            .is_none());

        transport.set_persistent(false, false);
        assert_eq!(transport.cached(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn readiness() {
        use std::os::unix::io::AsRawFd;

        let sock = UdpSocket::bind(localhost()).unwrap();
        let fds = [sock.as_raw_fd()];
        assert_eq!(poll_readable(&fds, Duration::ZERO).unwrap(), [false]);
        sock.send_to(b"x", sock.local_addr().unwrap()).unwrap();
        assert_eq!(
            poll_readable(&fds, Duration::from_secs(5)).unwrap(),
            [true]
        );
    }
}
