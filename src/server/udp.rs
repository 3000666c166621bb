//! Serving queries over UDP.

use super::service::make_reply;
use super::{no_socket, NameService, Nameserver};
use crate::base::message::Message;
use bytes::Bytes;
use std::io;
use std::net::SocketAddr;
use tracing::{debug, trace, warn};

/// The size of a reply that fits in any UDP datagram.
const PACKETSZ: usize = 512;

impl<S: NameService> Nameserver<S> {
    /// Receives a single datagram and answers it.
    ///
    /// Blocks until a datagram arrives. Errors while composing or sending
    /// the reply are logged and otherwise ignored, so only problems with
    /// the socket itself are returned.
    pub fn answer_udp(&self) -> io::Result<()> {
        let sock = self.udp.as_ref().ok_or_else(|| no_socket("UDP"))?;
        let mut buf = vec![0u8; usize::from(u16::MAX)];
        let (len, peer) = sock.recv_from(&mut buf)?;
        trace!("UDP query from {} ({} bytes)", peer, len);
        let wire = match self.udp_reply(&buf[..len], peer) {
            Some(wire) => wire,
            None => return Ok(()),
        };
        if let Err(err) = sock.send_to(&wire, peer) {
            warn!("failed to send reply to {}: {}", peer, err);
        }
        Ok(())
    }

    /// Produces the wire format of the reply to a UDP query.
    ///
    /// A reply too large for the query’s payload size is replaced by its
    /// header and question with the TC flag set.
    fn udp_reply(&self, query: &[u8], peer: SocketAddr) -> Option<Bytes> {
        let reply = make_reply(query, peer, &self.service)?;
        let wire = match reply.to_wire() {
            Ok(wire) => wire,
            Err(err) => {
                warn!("cannot compose reply to {}: {}", peer, err);
                return None;
            }
        };
        let limit = payload_size(query);
        if wire.len() <= limit {
            return Some(wire);
        }
        debug!(
            "reply to {} has {} bytes, truncating to fit {}",
            peer,
            wire.len(),
            limit
        );
        let mut truncated = Message::new();
        *truncated.header_mut() = *reply.header();
        truncated.header_mut().set_tc(true);
        for question in reply.question() {
            truncated.push_question(question.clone());
        }
        truncated.to_wire().ok()
    }
}

/// Returns the largest reply the sender of `query` can receive.
fn payload_size(query: &[u8]) -> usize {
    Message::from_wire(query)
        .ok()
        .and_then(|query| query.opt().map(|opt| opt.udp_payload_size()))
        .map(usize::from)
        .unwrap_or(PACKETSZ)
        .max(PACKETSZ)
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::iana::{Class, Rcode, Rtype};
    use crate::base::message::Section;
    use crate::base::name::test::name;
    use crate::base::name::Name;
    use crate::base::question::Question;
    use crate::base::record::Record;
    use crate::rdata::A;
    use crate::server::Reply;
    use std::net::{Ipv4Addr, UdpSocket};
    use std::time::Duration;

    fn many(qname: &Name, qclass: Class, _: Rtype, _: SocketAddr) -> Reply {
        let mut reply = Reply::new(Rcode::NOERROR);
        for i in 0..100 {
            reply.answer.push(Record::new(
                qname.clone(),
                qclass,
                60,
                A::new(Ipv4Addr::new(10, 0, 0, i)),
            ));
        }
        reply
    }

    fn query() -> Message {
        Message::query(
            Question::new(name("many.example"), Rtype::A, Class::IN),
            17,
        )
    }

    #[test]
    fn truncation() {
        let server = Nameserver::new(None, None, many);
        let peer = SocketAddr::from(([127, 0, 0, 1], 53));

        let wire = server
            .udp_reply(&query().to_wire().unwrap(), peer)
            .unwrap();
        assert!(wire.len() <= PACKETSZ);
        let reply = Message::from_wire(&wire).unwrap();
        assert!(reply.header().tc());
        assert_eq!(reply.question().len(), 1);
        assert!(reply.answer().is_empty());

        let mut edns = query();
        edns.push(Section::Additional, Record::opt(4096, 0, 0, 0));
        let wire = server
            .udp_reply(&edns.to_wire().unwrap(), peer)
            .unwrap();
        let reply = Message::from_wire(&wire).unwrap();
        assert!(!reply.header().tc());
        assert_eq!(reply.answer().len(), 100);
    }

    #[test]
    fn datagram() {
        let server = Nameserver::new(
            Some(UdpSocket::bind("127.0.0.1:0").unwrap()),
            None,
            many,
        );
        let client = UdpSocket::bind("127.0.0.1:0").unwrap();
        client
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let mut edns = query();
        edns.push(Section::Additional, Record::opt(4096, 0, 0, 0));
        client
            .send_to(&edns.to_wire().unwrap(), server.udp_addr().unwrap())
            .unwrap();
        server.answer_udp().unwrap();

        let mut buf = vec![0u8; 4096];
        let (len, _) = client.recv_from(&mut buf).unwrap();
        let reply = Message::from_wire(&buf[..len]).unwrap();
        assert_eq!(reply.id(), 17);
        assert_eq!(reply.answer().len(), 100);
    }

    #[test]
    fn missing_socket() {
        let server = Nameserver::new(None, None, many);
        assert!(server.answer_udp().is_err());
    }
}
