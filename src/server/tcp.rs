//! Serving queries over TCP.

use super::service::make_reply;
use super::{no_socket, NameService, Nameserver};
use crate::resolv::transport::{is_timeout, read_full, write_frame};
use std::io;
use std::net::{SocketAddr, TcpStream};
use std::time::Instant;
use tracing::{debug, trace, warn};

impl<S: NameService> Nameserver<S> {
    /// Accepts a single TCP connection and serves it.
    pub fn answer_tcp(&self) -> io::Result<()> {
        let listener = self.tcp.as_ref().ok_or_else(|| no_socket("TCP"))?;
        let (stream, peer) = listener.accept()?;
        debug!("TCP connection from {}", peer);
        self.handle_tcp(stream, peer);
        Ok(())
    }

    /// Serves queries arriving on a TCP connection.
    ///
    /// Returns when the client closes the connection, the connection has
    /// been idle for longer than the idle timeout, a query can’t be
    /// answered, or something goes wrong.
    pub fn handle_tcp(&self, mut stream: TcpStream, peer: SocketAddr) {
        if let Err(err) = stream.set_nodelay(true) {
            debug!("cannot set TCP_NODELAY for {}: {}", peer, err);
        }
        loop {
            match self.serve_tcp_query(&mut stream, peer) {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) if is_timeout(&err) => {
                    debug!("{} has been idle for too long", peer);
                    break;
                }
                Err(err) => {
                    warn!("TCP connection from {} failed: {}", peer, err);
                    break;
                }
            }
        }
        debug!("closing TCP connection from {}", peer);
    }

    /// Reads one query from the stream and answers it.
    ///
    /// Returns whether the connection should stay open.
    fn serve_tcp_query(
        &self,
        stream: &mut TcpStream,
        peer: SocketAddr,
    ) -> io::Result<bool> {
        let deadline = Instant::now() + self.idle_timeout;
        let mut len = [0u8; 2];
        match read_full(stream, &mut len, deadline)? {
            0 => return Ok(false),
            2 => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed within length prefix",
                ))
            }
        }
        let len = usize::from(u16::from_be_bytes(len));
        let mut query = vec![0u8; len];
        let got = read_full(stream, &mut query, deadline)?;
        if got < len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {} bytes, received {}", len, got),
            ));
        }
        trace!("TCP query from {} ({} bytes)", peer, len);

        let reply = match make_reply(&query, peer, &self.service) {
            Some(reply) => reply,
            None => {
                debug!("no reply for {}", peer);
                return Ok(false);
            }
        };
        let wire = reply
            .to_wire()
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        write_frame(stream, &wire)?;
        Ok(true)
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::iana::{Class, Rcode, Rtype};
    use crate::base::message::Message;
    use crate::base::name::test::name;
    use crate::base::name::Name;
    use crate::base::question::Question;
    use crate::resolv::transport::read_frame;
    use crate::server::Reply;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    fn refuse(_: &Name, _: Class, _: Rtype, _: SocketAddr) -> Reply {
        Reply::new(Rcode::REFUSED)
    }

    fn query(id: u16) -> Vec<u8> {
        Message::query(
            Question::new(name("example.com"), Rtype::SOA, Class::IN),
            id,
        )
        .to_wire()
        .unwrap()
        .to_vec()
    }

    #[test]
    fn several_queries() {
        let server = Nameserver::new(
            None,
            Some(TcpListener::bind("127.0.0.1:0").unwrap()),
            refuse,
        );
        let addr = server.tcp_addr().unwrap();
        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            let mut ids = Vec::new();
            for id in [1, 2, 3] {
                write_frame(&mut stream, &query(id)).unwrap();
                let deadline = Instant::now() + Duration::from_secs(5);
                let reply = read_frame(&mut stream, deadline).unwrap();
                let reply = Message::from_wire(&reply).unwrap();
                assert_eq!(reply.header().rcode(), Rcode::REFUSED);
                ids.push(reply.id());
            }
            ids
        });
        server.answer_tcp().unwrap();
        assert_eq!(client.join().unwrap(), [1, 2, 3]);
    }

    #[test]
    fn short_query() {
        let mut server = Nameserver::new(
            None,
            Some(TcpListener::bind("127.0.0.1:0").unwrap()),
            refuse,
        );
        server.set_idle_timeout(Duration::from_secs(5));
        let addr = server.tcp_addr().unwrap();
        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(b"\x00\x20\x12\x34").unwrap();
        });
        server.answer_tcp().unwrap();
        client.join().unwrap();
    }

    #[test]
    fn idle_connection() {
        let mut server = Nameserver::new(
            None,
            Some(TcpListener::bind("127.0.0.1:0").unwrap()),
            refuse,
        );
        server.set_idle_timeout(Duration::from_millis(100));
        let addr = server.tcp_addr().unwrap();
        let stream = TcpStream::connect(addr).unwrap();
        let start = Instant::now();
        server.answer_tcp().unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
        drop(stream);
    }
}
