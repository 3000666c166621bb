//! Zone transfers against a mock server.

mod common;

use common::{init_logging, name, reply, MockServer};
use netdns::base::record::Record;
use netdns::base::{Class, Message, Rcode, Rtype, Section};
use netdns::rdata::{Ns, Soa, A};
use netdns::Error;
use std::net::Ipv4Addr;

fn soa() -> Record {
    Record::new(
        name("example.com"),
        Class::IN,
        3600,
        Soa::new(
            name("ns.example.com"),
            name("hostmaster.example.com"),
            2024010101,
            7200,
            3600,
            1209600,
            300,
        ),
    )
}

fn ns() -> Record {
    Record::new(
        name("example.com"),
        Class::IN,
        3600,
        Ns::new(name("ns.example.com")),
    )
}

fn a(owner: &str, last: u8) -> Record {
    Record::new(
        name(owner),
        Class::IN,
        3600,
        A::new(Ipv4Addr::new(192, 0, 2, last)),
    )
}

fn message(query: &Message, records: Vec<Record>) -> Message {
    let mut res = reply(query);
    for record in records {
        res.push(Section::Answer, record);
    }
    res
}

/// Sends the zone in three messages.
fn transfer(query: &Message) -> Vec<Message> {
    assert_eq!(query.first_question().unwrap().qtype(), Rtype::AXFR);
    vec![
        message(query, vec![soa(), ns()]),
        message(query, vec![a("ns.example.com", 53), a("www.example.com", 80)]),
        message(query, vec![soa()]),
    ]
}

/// Sends a two record zone named after the question, the closing SOA in
/// a message of its own.
fn zone_of_question(query: &Message) -> Vec<Message> {
    let zone = query.first_question().unwrap().qname().to_string();
    let soa = Record::new(
        name(&zone),
        Class::IN,
        3600,
        Soa::new(
            name(&format!("ns.{}", zone)),
            name(&format!("hostmaster.{}", zone)),
            1,
            7200,
            3600,
            1209600,
            300,
        ),
    );
    vec![
        message(query, vec![soa.clone(), a(&format!("host.{}", zone), 1)]),
        message(query, vec![soa]),
    ]
}

#[test]
fn whole_zone() {
    init_logging();
    let server = MockServer::tcp(transfer);
    let mut res = server.resolver();
    let zone = res.axfr(Some("example.com"), Class::IN).unwrap();
    let types: Vec<_> = zone.iter().map(Record::rtype).collect();
    assert_eq!(types, [Rtype::SOA, Rtype::NS, Rtype::A, Rtype::A]);
    assert_eq!(server.tcp_queries(), 1);
}

#[test]
fn record_by_record() {
    init_logging();
    let server = MockServer::tcp(transfer);
    let mut res = server.resolver();
    res.conf_mut().searchlist = vec![name("example.com")];
    res.axfr_start(None, Class::IN).unwrap();
    let first = res.axfr_next().unwrap().unwrap();
    assert_eq!(first.rtype(), Rtype::SOA);
    assert_eq!(*first.owner(), name("example.com"));
    let mut count = 1;
    while res.axfr_next().unwrap().is_some() {
        count += 1;
    }
    assert_eq!(count, 4);
    assert!(matches!(
        res.axfr_next(),
        Err(Error::ZoneTransferAborted(_))
    ));
}

#[test]
fn refused() {
    init_logging();
    let server = MockServer::tcp(|query| {
        let mut answer = reply(query);
        answer.header_mut().set_rcode(Rcode::REFUSED);
        vec![answer]
    });
    let mut res = server.resolver();
    let err = res.axfr(Some("example.com"), Class::IN).unwrap_err();
    assert!(matches!(err, Error::ZoneTransferAborted(_)));
    assert_eq!(res.errorstring(), "Response code from server: REFUSED");
}

#[test]
fn stalled_transfer() {
    init_logging();
    let server = MockServer::tcp(|query| vec![message(query, vec![soa(), ns()])]);
    let mut res = server.resolver();
    res.axfr_start(Some("example.com"), Class::IN).unwrap();
    assert_eq!(res.axfr_next().unwrap().unwrap().rtype(), Rtype::SOA);
    assert_eq!(res.axfr_next().unwrap().unwrap().rtype(), Rtype::NS);
    // The server keeps the connection open waiting for the next query,
    // so we run into the timeout.
    res.conf_mut().tcp_timeout = std::time::Duration::from_millis(200);
    assert!(res.axfr_next().is_err());
    assert_eq!(res.errorstring(), "timeout");
}

#[test]
fn persistent_connection_is_reused() {
    init_logging();
    let server = MockServer::tcp(zone_of_question);
    let mut res = server.resolver();
    res.conf_mut().persistent_tcp = true;
    for zone in ["one.example", "two.example"] {
        let records = res.axfr(Some(zone), Class::IN).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|record| record.owner().ends_with(&name(zone))));
    }
    assert_eq!(server.tcp_queries(), 2);
    assert_eq!(server.tcp_connections(), 1);
}

#[test]
fn abandoned_transfer_does_not_leak() {
    init_logging();
    let server = MockServer::tcp(zone_of_question);
    let mut res = server.resolver();
    res.conf_mut().persistent_tcp = true;
    res.axfr_start(Some("old.example"), Class::IN).unwrap();
    assert_eq!(res.axfr_next().unwrap().unwrap().rtype(), Rtype::SOA);

    let records = res.axfr(Some("new.example"), Class::IN).unwrap();
    let owners: Vec<_> = records.iter().map(|r| r.owner().to_string()).collect();
    assert_eq!(owners, ["new.example", "host.new.example"]);
    assert_eq!(server.tcp_connections(), 2);
}

#[test]
fn foreign_messages_are_skipped() {
    init_logging();
    let server = MockServer::tcp(|query| {
        let mut stray = message(query, vec![a("stray.example.net", 9)]);
        stray.set_id(query.id().wrapping_add(1));
        let mut not_an_answer = message(query, vec![a("query.example.net", 10)]);
        not_an_answer.header_mut().set_qr(false);
        let mut res = vec![stray, not_an_answer];
        res.extend(transfer(query));
        res
    });
    let mut res = server.resolver();
    let zone = res.axfr(Some("example.com"), Class::IN).unwrap();
    let types: Vec<_> = zone.iter().map(Record::rtype).collect();
    assert_eq!(types, [Rtype::SOA, Rtype::NS, Rtype::A, Rtype::A]);
    assert!(zone.iter().all(|record| record.owner().ends_with(&name("example.com"))));
}
