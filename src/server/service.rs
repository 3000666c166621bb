//! Turning queries into replies.

use crate::base::iana::{Class, Opcode, Rcode, Rtype};
use crate::base::message::{Message, Section};
use crate::base::name::Name;
use crate::base::record::Record;
use std::net::SocketAddr;
use tracing::{debug, trace};

//------------ NameService ---------------------------------------------------

/// Something that can answer a question.
///
/// The service is only ever asked about queries with the QUERY opcode and
/// exactly one question. Everything else is dealt with by
/// [`make_reply`] directly.
///
/// The trait is implemented for closures with the same signature as
/// [`answer`][Self::answer], so usually there is no need to implement it.
pub trait NameService {
    /// Produces the reply content for a question received from `peer`.
    fn answer(
        &self,
        qname: &Name,
        qclass: Class,
        qtype: Rtype,
        peer: SocketAddr,
    ) -> Reply;
}

impl<F> NameService for F
where
    F: Fn(&Name, Class, Rtype, SocketAddr) -> Reply,
{
    fn answer(
        &self,
        qname: &Name,
        qclass: Class,
        qtype: Rtype,
        peer: SocketAddr,
    ) -> Reply {
        (self)(qname, qclass, qtype, peer)
    }
}

//------------ Reply ---------------------------------------------------------

/// The content of a reply as provided by a [`NameService`].
#[derive(Clone, Debug)]
pub struct Reply {
    /// The response code.
    pub rcode: Rcode,

    /// The records for the answer section.
    pub answer: Vec<Record>,

    /// The records for the authority section.
    pub authority: Vec<Record>,

    /// The records for the additional section.
    pub additional: Vec<Record>,

    /// Explicit header flags.
    ///
    /// If this is `None`, the reply will have RA set and AD cleared.
    pub flags: Option<ReplyFlags>,
}

impl Reply {
    /// Creates an empty reply with the given response code.
    pub fn new(rcode: Rcode) -> Self {
        Reply {
            rcode,
            answer: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
            flags: None,
        }
    }

    /// Adds a record to the answer section.
    pub fn with_answer(mut self, record: Record) -> Self {
        self.answer.push(record);
        self
    }

    /// Adds a record to the authority section.
    pub fn with_authority(mut self, record: Record) -> Self {
        self.authority.push(record);
        self
    }

    /// Adds a record to the additional section.
    pub fn with_additional(mut self, record: Record) -> Self {
        self.additional.push(record);
        self
    }

    /// Sets explicit header flags.
    pub fn with_flags(mut self, flags: ReplyFlags) -> Self {
        self.flags = Some(flags);
        self
    }
}

//------------ ReplyFlags ----------------------------------------------------

/// The header flags a service can choose for its replies.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReplyFlags {
    /// Authoritative answer.
    pub aa: bool,

    /// Recursion available.
    pub ra: bool,

    /// Authentic data.
    pub ad: bool,
}

//------------ make_reply ----------------------------------------------------

/// Creates the reply to a query received in wire format from `peer`.
///
/// Returns `None` if the query shouldn’t be answered at all. This is the
/// case if the message already is a response or if it is too short to even
/// contain a message ID. Any other message that can’t be parsed is answered
/// with FORMERR, as is any message that isn’t a QUERY with exactly one
/// question.
pub fn make_reply<S: NameService + ?Sized>(
    query: &[u8],
    peer: SocketAddr,
    service: &S,
) -> Option<Message> {
    if query.get(2).map(|bits| bits & 0x80 != 0).unwrap_or(false) {
        debug!("dropping response from {}", peer);
        return None;
    }
    let query = match Message::from_wire(query) {
        Ok(query) => query,
        Err(err) => {
            let id = query.get(..2)?;
            debug!("malformed query from {}: {}", peer, err);
            let mut reply = Message::new();
            reply.set_id(u16::from_be_bytes([id[0], id[1]]));
            reply.header_mut().set_qr(true);
            reply.header_mut().set_ra(true);
            reply.header_mut().set_rcode(Rcode::FORMERR);
            return Some(reply);
        }
    };

    let mut reply = Message::reply_to(&query);
    let mut flags = None;
    if query.header().opcode() != Opcode::QUERY {
        debug!(
            "query {} from {}: opcode {} unsupported",
            query.id(),
            peer,
            query.header().opcode()
        );
        reply.header_mut().set_rcode(Rcode::FORMERR);
    } else if query.question().len() != 1 {
        debug!(
            "query {} from {}: {} questions unsupported",
            query.id(),
            peer,
            query.question().len()
        );
        reply.header_mut().set_rcode(Rcode::FORMERR);
    } else {
        let question = &query.question()[0];
        let answer = service.answer(
            question.qname(),
            question.qclass(),
            question.qtype(),
            peer,
        );
        trace!(
            "query {}: ({}, {}, {}) - {}",
            query.id(),
            question.qname(),
            question.qclass(),
            question.qtype(),
            answer.rcode
        );
        reply.header_mut().set_rcode(answer.rcode);
        for record in answer.answer {
            reply.push(Section::Answer, record);
        }
        for record in answer.authority {
            reply.push(Section::Authority, record);
        }
        for record in answer.additional {
            reply.push(Section::Additional, record);
        }
        flags = answer.flags;
    }

    let header = reply.header_mut();
    match flags {
        Some(flags) => {
            header.set_aa(flags.aa);
            header.set_ra(flags.ra);
            header.set_ad(flags.ad);
        }
        None => {
            header.set_ra(true);
            header.set_ad(false);
        }
    }
    Some(reply)
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::name::test::name;
    use crate::base::question::Question;
    use crate::rdata::A;
    use std::net::{IpAddr, Ipv4Addr};

    fn peer() -> SocketAddr {
        SocketAddr::from(([192, 0, 2, 1], 5353))
    }

    fn service(
        qname: &Name,
        qclass: Class,
        qtype: Rtype,
        _peer: SocketAddr,
    ) -> Reply {
        if *qname == name("www.example.com") && qtype == Rtype::A {
            Reply::new(Rcode::NOERROR).with_answer(Record::new(
                qname.clone(),
                qclass,
                3600,
                A::new(Ipv4Addr::new(192, 0, 2, 80)),
            ))
        } else {
            Reply::new(Rcode::NXDOMAIN)
        }
    }

    fn query(qname: &str) -> Message {
        let mut msg = Message::query(
            Question::new(name(qname), Rtype::A, Class::IN),
            4711,
        );
        msg.header_mut().set_rd(true);
        msg.header_mut().set_cd(true);
        msg
    }

    #[test]
    fn answers_query() {
        let wire = query("www.example.com").to_wire().unwrap();
        let reply = make_reply(&wire, peer(), &service).unwrap();
        assert_eq!(reply.id(), 4711);
        assert!(reply.header().qr());
        assert!(reply.header().rd());
        assert!(reply.header().cd());
        assert!(reply.header().ra());
        assert!(!reply.header().ad());
        assert!(!reply.header().aa());
        assert_eq!(reply.header().rcode(), Rcode::NOERROR);
        assert_eq!(reply.question().len(), 1);
        assert_eq!(reply.answer().len(), 1);
        assert_eq!(
            reply.each_address().collect::<Vec<_>>(),
            [IpAddr::from([192, 0, 2, 80])]
        );
    }

    #[test]
    fn handler_rcode() {
        let wire = query("nonexistent.example.com").to_wire().unwrap();
        let reply = make_reply(&wire, peer(), &service).unwrap();
        assert_eq!(reply.header().rcode(), Rcode::NXDOMAIN);
        assert!(reply.answer().is_empty());
    }

    #[test]
    fn explicit_flags() {
        let service = |_: &Name, _: Class, _: Rtype, _: SocketAddr| {
            Reply::new(Rcode::NOERROR).with_flags(ReplyFlags {
                aa: true,
                ra: false,
                ad: true,
            })
        };
        let wire = query("example.com").to_wire().unwrap();
        let reply = make_reply(&wire, peer(), &service).unwrap();
        assert!(reply.header().aa());
        assert!(!reply.header().ra());
        assert!(reply.header().ad());
    }

    #[test]
    fn response_is_dropped() {
        let mut msg = query("www.example.com");
        msg.header_mut().set_qr(true);
        let wire = msg.to_wire().unwrap();
        assert!(make_reply(&wire, peer(), &service).is_none());
    }

    #[test]
    fn garbage() {
        let reply = make_reply(b"\x12\x34\x00", peer(), &service).unwrap();
        assert_eq!(reply.id(), 0x1234);
        assert!(reply.header().qr());
        assert_eq!(reply.header().rcode(), Rcode::FORMERR);
        assert!(reply.question().is_empty());

        assert!(make_reply(b"\x12", peer(), &service).is_none());
        assert!(make_reply(b"", peer(), &service).is_none());
    }

    #[test]
    fn wrong_question_count() {
        let mut msg = query("www.example.com");
        msg.push_question(Question::new(
            name("example.com"),
            Rtype::MX,
            Class::IN,
        ));
        let wire = msg.to_wire().unwrap();
        let reply = make_reply(&wire, peer(), &service).unwrap();
        assert_eq!(reply.header().rcode(), Rcode::FORMERR);
        assert_eq!(reply.question().len(), 2);

        let mut msg = query("www.example.com");
        msg.pop_question();
        let wire = msg.to_wire().unwrap();
        let reply = make_reply(&wire, peer(), &service).unwrap();
        assert_eq!(reply.header().rcode(), Rcode::FORMERR);
    }

    #[test]
    fn wrong_opcode() {
        let mut msg = query("www.example.com");
        msg.header_mut().set_opcode(Opcode::STATUS);
        let wire = msg.to_wire().unwrap();
        let reply = make_reply(&wire, peer(), &service).unwrap();
        assert_eq!(reply.header().rcode(), Rcode::FORMERR);
        assert!(reply.header().qr());
        assert_eq!(reply.id(), 4711);
    }
}
