//! Answering queries.
//!
//! This module contains the reply side of a name server. The heart of it
//! is [`make_reply`] which turns a query in wire format into a reply with
//! the help of a [`NameService`] that provides the records. The
//! [`Nameserver`] wraps a service together with a UDP socket and a TCP
//! listener and serves queries arriving on them.
//!
//! ```no_run
//! use std::net::SocketAddr;
//! use netdns::base::{Class, Name, Rcode, Rtype};
//! use netdns::server::{Nameserver, Reply};
//!
//! let server = Nameserver::bind(
//!     "127.0.0.1:5353".parse().unwrap(),
//!     |_: &Name, _: Class, _: Rtype, _: SocketAddr| {
//!         Reply::new(Rcode::REFUSED)
//!     },
//! ).unwrap();
//! server.run().unwrap();
//! ```

pub use self::service::{make_reply, NameService, Reply, ReplyFlags};

use std::net::{SocketAddr, TcpListener, UdpSocket};
use std::time::Duration;
use std::{fmt, io};

pub mod service;
mod tcp;
mod udp;

//------------ Nameserver ----------------------------------------------------

/// A name server answering queries over UDP and TCP.
pub struct Nameserver<S> {
    /// The service providing the answers.
    service: S,

    /// The socket for UDP queries.
    udp: Option<UdpSocket>,

    /// The listener for TCP connections.
    tcp: Option<TcpListener>,

    /// How long a TCP connection may stay idle before it is closed.
    idle_timeout: Duration,
}

impl<S: NameService> Nameserver<S> {
    /// The default idle timeout for TCP connections.
    pub const IDLE_TIMEOUT: Duration = Duration::from_secs(120);

    /// Creates a name server from already bound sockets.
    pub fn new(
        udp: Option<UdpSocket>,
        tcp: Option<TcpListener>,
        service: S,
    ) -> Self {
        Nameserver {
            service,
            udp,
            tcp,
            idle_timeout: Self::IDLE_TIMEOUT,
        }
    }

    /// Creates a name server listening on `addr` for both UDP and TCP.
    ///
    /// If the port of `addr` is zero, the TCP listener is bound to the
    /// port picked for the UDP socket.
    pub fn bind(addr: SocketAddr, service: S) -> io::Result<Self> {
        let udp = UdpSocket::bind(addr)?;
        let tcp = TcpListener::bind(udp.local_addr()?)?;
        Ok(Self::new(Some(udp), Some(tcp), service))
    }

    /// Sets the idle timeout for TCP connections.
    pub fn set_idle_timeout(&mut self, timeout: Duration) {
        self.idle_timeout = timeout
    }

    /// Returns a reference to the service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Returns the local address of the UDP socket.
    pub fn udp_addr(&self) -> Option<SocketAddr> {
        self.udp.as_ref().and_then(|sock| sock.local_addr().ok())
    }

    /// Returns the local address of the TCP listener.
    pub fn tcp_addr(&self) -> Option<SocketAddr> {
        self.tcp.as_ref().and_then(|sock| sock.local_addr().ok())
    }

    /// Serves queries until an error happens.
    ///
    /// TCP connections are served one at a time, each until the client
    /// closes it or it has been idle for too long.
    #[cfg(unix)]
    pub fn run(&self) -> io::Result<()> {
        loop {
            self.loop_once(None)?;
        }
    }

    /// Waits for a query and serves it.
    ///
    /// Waits for at most `timeout` or forever if that is `None`.
    #[cfg(unix)]
    pub fn loop_once(&self, timeout: Option<Duration>) -> io::Result<()> {
        use crate::resolv::transport::poll_readable;
        use std::os::unix::io::AsRawFd;

        let fds = [
            self.udp.as_ref().map(AsRawFd::as_raw_fd),
            self.tcp.as_ref().map(AsRawFd::as_raw_fd),
        ];
        let ready = poll_readable(
            &fds.iter().flatten().copied().collect::<Vec<_>>(),
            timeout.unwrap_or(Duration::from_millis(u32::MAX.into())),
        )?;
        let mut ready = ready.into_iter();
        if fds[0].is_some() && ready.next().unwrap_or(false) {
            self.answer_udp()?;
        }
        if fds[1].is_some() && ready.next().unwrap_or(false) {
            self.answer_tcp()?;
        }
        Ok(())
    }
}

impl<S> fmt::Debug for Nameserver<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Nameserver")
            .field("udp", &self.udp)
            .field("tcp", &self.tcp)
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

fn no_socket(kind: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotConnected,
        format!("no {} socket", kind),
    )
}
